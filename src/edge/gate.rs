//! Per-request edge decision.
//!
//! The gate is a pure function of the request and its construction-time
//! configuration. It holds no mutable state, performs no I/O and does not
//! log, so one instance can be shared across any number of concurrent
//! requests and re-evaluated on retries.

use crate::config::GateConfig;
use crate::edge::classify::{UaClassifier, UserAgentClass};
use crate::edge::credentials::parse_basic_credentials;
use crate::edge::paths::{normalize_path, PathRules};
use crate::GateError;
use http::header::{
    HeaderName, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, USER_AGENT, WWW_AUTHENTICATE,
};
use http::{HeaderMap, HeaderValue, Request, Response, StatusCode};
use std::borrow::Cow;

/// Body of a 401 response.
pub const UNAUTHORIZED_BODY: &str = "Authentication required";

/// Body of a 403 response.
pub const FORBIDDEN_BODY: &str = r#"{"error":"Forbidden"}"#;

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Let the request through untouched.
    Pass,
    /// Answer the request here.
    Deny(Denial),
}

impl Verdict {
    /// Whether the request proceeds to the application.
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Why a request was stopped at the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// Missing or wrong Basic credentials.
    Unauthorized {
        /// Realm advertised in the challenge.
        realm: String,
    },
    /// Bot or suspicious user-agent on an API route.
    Forbidden,
}

impl Denial {
    /// HTTP status for this denial.
    pub fn status(&self) -> StatusCode {
        match self {
            Denial::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Denial::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// Render the denial as a complete HTTP response.
    pub fn into_response(self) -> Response<String> {
        match self {
            Denial::Unauthorized { realm } => {
                let mut response = Response::new(UNAUTHORIZED_BODY.to_string());
                *response.status_mut() = StatusCode::UNAUTHORIZED;
                let headers = response.headers_mut();
                headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
                headers.insert(WWW_AUTHENTICATE, challenge_header(&realm));
                response
            }
            Denial::Forbidden => {
                let mut response = Response::new(FORBIDDEN_BODY.to_string());
                *response.status_mut() = StatusCode::FORBIDDEN;
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                response
            }
        }
    }
}

fn challenge_header(realm: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm))
        .unwrap_or_else(|_| HeaderValue::from_static(r#"Basic realm="WorldMonitor""#))
}

/// Stateless edge gate: Basic auth on protected paths, then bot filtering
/// on API paths.
#[derive(Debug, Clone)]
pub struct EdgeGate {
    config: GateConfig,
    rules: PathRules,
    classifier: UaClassifier,
}

impl EdgeGate {
    /// Create a gate with the standard path rules and UA table.
    ///
    /// # Errors
    /// Returns `ConfigError` if the configuration fails validation.
    pub fn new(config: GateConfig) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self {
            config,
            rules: PathRules::default(),
            classifier: UaClassifier::standard().clone(),
        })
    }

    /// Replace the path rules.
    pub fn with_rules(mut self, rules: PathRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the UA classifier.
    pub fn with_classifier(mut self, classifier: UaClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Evaluate an HTTP request.
    pub fn evaluate<B>(&self, request: &Request<B>) -> Verdict {
        self.evaluate_headers(request.uri().path(), request.headers())
    }

    /// Evaluate a path plus header map.
    ///
    /// Header bytes outside ASCII are read as Latin-1.
    pub fn evaluate_headers(&self, path: &str, headers: &HeaderMap) -> Verdict {
        let authorization = header_text(headers, &AUTHORIZATION);
        let user_agent = header_text(headers, &USER_AGENT);
        self.evaluate_parts(path, authorization.as_deref(), user_agent.as_deref())
    }

    /// Evaluate the raw inputs the decision depends on.
    ///
    /// `.` and `..` segments in `path` are resolved before any rule is
    /// consulted. Rules, first match wins:
    /// 1. internal and allowlisted paths skip authentication
    /// 2. with a secret configured, protected paths need valid Basic credentials (401)
    /// 3. non-API paths pass
    /// 4. social-preview crawlers pass on the preview endpoints
    /// 5. bots get 403
    /// 6. missing or short user-agents get 403
    /// 7. everything else passes
    pub fn evaluate_parts(
        &self,
        path: &str,
        authorization: Option<&str>,
        user_agent: Option<&str>,
    ) -> Verdict {
        let normalized = normalize_path(path);
        let path: &str = &normalized;

        if self.rules.is_protected(path) && !self.is_authorized(authorization) {
            return Verdict::Deny(Denial::Unauthorized {
                realm: self.config.auth_realm.clone(),
            });
        }

        if !self.rules.is_api(path) {
            return Verdict::Pass;
        }

        let user_agent = user_agent.unwrap_or("");

        if self.rules.allows_social_preview(path) && self.classifier.is_social_preview(user_agent) {
            return Verdict::Pass;
        }

        match self.classifier.classify_automated(user_agent) {
            UserAgentClass::Bot | UserAgentClass::Suspicious => Verdict::Deny(Denial::Forbidden),
            UserAgentClass::SocialPreview | UserAgentClass::Ordinary => Verdict::Pass,
        }
    }

    /// Check Basic credentials against the configured secret.
    ///
    /// Always `true` when no secret is configured.
    pub fn is_authorized(&self, authorization: Option<&str>) -> bool {
        let expected_password = match self.config.expected_password.as_deref() {
            Some(password) => password,
            None => return true,
        };

        let credentials = match parse_basic_credentials(authorization) {
            Some(credentials) => credentials,
            None => return false,
        };

        if credentials.password != expected_password {
            return false;
        }

        match self.config.expected_username.as_deref() {
            Some(username) => credentials.username == username,
            None => true,
        }
    }
}

fn header_text<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<Cow<'a, str>> {
    headers.get(name).map(|value| match value.to_str() {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(value.as_bytes().iter().map(|&b| char::from(b)).collect()),
    })
}

impl Default for EdgeGate {
    fn default() -> Self {
        Self {
            config: GateConfig::default(),
            rules: PathRules::default(),
            classifier: UaClassifier::standard().clone(),
        }
    }
}
