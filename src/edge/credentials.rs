//! HTTP Basic `Authorization` header parsing.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use std::fmt;

/// Standard alphabet, tolerant of missing `=` padding like browser `atob`.
const BASIC_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Username/password pair decoded from a single request header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Everything before the first colon.
    pub username: String,
    /// Everything after the first colon, colons included.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Encode as an `Authorization` header value.
    pub fn to_header_value(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", base64::engine::general_purpose::STANDARD.encode(raw))
    }
}

/// Parse a Basic `Authorization` header value.
///
/// Format: `Basic <base64(username:password)>`, exactly two tokens separated
/// by a single space. The scheme is case-insensitive. The decoded payload
/// is split on the first colon, so passwords may contain colons and
/// usernames cannot.
///
/// Returns `None` for a missing header, wrong scheme, bad base64, non-UTF-8
/// payload or a payload without a colon.
pub fn parse_basic_credentials(header: Option<&str>) -> Option<Credentials> {
    let header = header?;

    let mut tokens = header.split(' ');
    let scheme = tokens.next()?;
    let encoded = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    if !scheme.eq_ignore_ascii_case("basic") || encoded.is_empty() {
        return None;
    }

    let decoded = BASIC_ENGINE.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(Credentials::new(username, password))
}
