//! Path rules consulted by the edge gate.

use std::borrow::Cow;

/// Platform-internal routes. Never challenged.
pub const INTERNAL_PREFIX: &str = "/_vercel/";

/// Exact paths exempt from authentication.
pub const AUTH_BYPASS_PATHS: &[&str] = &["/favicon.ico"];

/// Prefix of routes that get bot filtering.
pub const API_PREFIX: &str = "/api/";

/// Exact API paths that social-preview crawlers may fetch.
pub const SOCIAL_PREVIEW_PATHS: &[&str] = &["/api/story", "/api/og-story"];

/// Fixed path data for one gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRules {
    /// Prefix of internal infrastructure routes.
    pub internal_prefix: &'static str,
    /// Exact paths exempt from authentication.
    pub auth_bypass: &'static [&'static str],
    /// Prefix that marks a path as an API route.
    pub api_prefix: &'static str,
    /// Exact API paths open to social-preview crawlers.
    pub social_preview: &'static [&'static str],
}

impl Default for PathRules {
    fn default() -> Self {
        Self {
            internal_prefix: INTERNAL_PREFIX,
            auth_bypass: AUTH_BYPASS_PATHS,
            api_prefix: API_PREFIX,
            social_preview: SOCIAL_PREVIEW_PATHS,
        }
    }
}

impl PathRules {
    /// Whether the path requires authentication when a secret is configured.
    pub fn is_protected(&self, path: &str) -> bool {
        if path.starts_with(self.internal_prefix) {
            return false;
        }
        !self.auth_bypass.iter().any(|p| *p == path)
    }

    /// Whether the path is an API route.
    pub fn is_api(&self, path: &str) -> bool {
        path.starts_with(self.api_prefix)
    }

    /// Whether social-preview crawlers may fetch this exact path.
    pub fn allows_social_preview(&self, path: &str) -> bool {
        self.social_preview.iter().any(|p| *p == path)
    }
}

/// Resolve `.` and `..` segments the way a URL parser does before routing.
///
/// Percent-encoded dots (`%2e`) count as dots. `..` never climbs above the
/// root, and a trailing dot segment leaves a trailing slash. Paths that do
/// not start with `/` or carry no dot segments come back unchanged.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let Some(rest) = path.strip_prefix('/') else {
        return Cow::Borrowed(path);
    };

    let segments: Vec<&str> = rest.split('/').collect();
    if !segments
        .iter()
        .any(|segment| is_single_dot(segment) || is_double_dot(segment))
    {
        return Cow::Borrowed(path);
    }

    let last = segments.len() - 1;
    let mut output: Vec<&str> = Vec::with_capacity(segments.len());
    for (i, segment) in segments.into_iter().enumerate() {
        if is_double_dot(segment) {
            output.pop();
            if i == last {
                output.push("");
            }
        } else if is_single_dot(segment) {
            if i == last {
                output.push("");
            }
        } else {
            output.push(segment);
        }
    }

    Cow::Owned(format!("/{}", output.join("/")))
}

fn is_single_dot(segment: &str) -> bool {
    segment == "." || segment.eq_ignore_ascii_case("%2e")
}

fn is_double_dot(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}
