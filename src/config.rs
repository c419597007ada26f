//! Gate configuration.

use crate::GateError;

/// Default realm advertised in the Basic challenge.
pub const DEFAULT_AUTH_REALM: &str = "WorldMonitor";

/// Environment variable holding the edge shared secret.
pub const ENV_APP_PASSWORD: &str = "APP_PASSWORD";
/// Environment variable holding the optional edge username.
pub const ENV_APP_USERNAME: &str = "APP_USERNAME";
/// Environment variable holding the optional challenge realm.
pub const ENV_APP_AUTH_REALM: &str = "APP_AUTH_REALM";
/// Environment variable holding the client overlay secret.
pub const ENV_CLIENT_GATE_PASSWORD: &str = "VITE_APP_PASSWORD";

/// Configuration shared by the edge gate and the client overlay.
///
/// Values are read once and never change for the lifetime of a gate.
/// Every string is trimmed on construction and an empty string means unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Edge shared secret. `None` disables the Basic auth check entirely.
    pub expected_password: Option<String>,

    /// When set, the Basic username must match exactly.
    /// When unset, any username is accepted alongside the right password.
    pub expected_username: Option<String>,

    /// Realm shown in the `WWW-Authenticate` challenge.
    pub auth_realm: String,

    /// Independent secret for the client overlay. `None` skips the overlay.
    pub client_gate_password: Option<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            expected_password: None,
            expected_username: None,
            auth_realm: DEFAULT_AUTH_REALM.to_string(),
            client_gate_password: None,
        }
    }
}

impl GateConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Uses the same variable names as [`GateConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            expected_password: normalize(lookup(ENV_APP_PASSWORD)),
            expected_username: normalize(lookup(ENV_APP_USERNAME)),
            auth_realm: normalize(lookup(ENV_APP_AUTH_REALM))
                .unwrap_or_else(|| DEFAULT_AUTH_REALM.to_string()),
            client_gate_password: normalize(lookup(ENV_CLIENT_GATE_PASSWORD)),
        }
    }

    /// Set the edge shared secret.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.expected_password = normalize(Some(password.into()));
        self
    }

    /// Set the required edge username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.expected_username = normalize(Some(username.into()));
        self
    }

    /// Set the challenge realm. Blank input falls back to the default.
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.auth_realm =
            normalize(Some(realm.into())).unwrap_or_else(|| DEFAULT_AUTH_REALM.to_string());
        self
    }

    /// Set the client overlay secret.
    pub fn with_client_gate_password(mut self, password: impl Into<String>) -> Self {
        self.client_gate_password = normalize(Some(password.into()));
        self
    }

    /// Whether the edge Basic auth check is active.
    pub fn edge_auth_enabled(&self) -> bool {
        self.expected_password.is_some()
    }

    /// Whether the client overlay is active.
    pub fn client_gate_enabled(&self) -> bool {
        self.client_gate_password.is_some()
    }

    /// Validate configuration for obvious errors.
    ///
    /// The realm is interpolated into a quoted header value, so quotes and
    /// control characters are rejected.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.auth_realm.is_empty() {
            return Err(GateError::ConfigError(
                "auth_realm cannot be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .auth_realm
            .chars()
            .find(|c| *c == '"' || *c == '\\' || c.is_control())
        {
            return Err(GateError::ConfigError(format!(
                "auth_realm contains forbidden character {:?}",
                bad
            )));
        }
        Ok(())
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_disable_both_gates() {
        let config = GateConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, GateConfig::default());
        assert!(!config.edge_auth_enabled());
        assert!(!config.client_gate_enabled());
        assert_eq!(config.auth_realm, "WorldMonitor");
    }

    #[test]
    fn test_values_are_trimmed() {
        let config = GateConfig::from_lookup(lookup_from(&[
            ("APP_PASSWORD", "  secret123 \n"),
            ("APP_USERNAME", " admin "),
            ("APP_AUTH_REALM", " Ops "),
            ("VITE_APP_PASSWORD", "\thunter2"),
        ]));
        assert_eq!(config.expected_password.as_deref(), Some("secret123"));
        assert_eq!(config.expected_username.as_deref(), Some("admin"));
        assert_eq!(config.auth_realm, "Ops");
        assert_eq!(config.client_gate_password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = GateConfig::from_lookup(lookup_from(&[
            ("APP_PASSWORD", "   "),
            ("APP_USERNAME", ""),
            ("APP_AUTH_REALM", "  "),
            ("VITE_APP_PASSWORD", ""),
        ]));
        assert_eq!(config, GateConfig::default());
    }

    #[test]
    fn test_builder_helpers() {
        let config = GateConfig::default()
            .with_password("pw")
            .with_username("user")
            .with_realm("  ")
            .with_client_gate_password(" ");
        assert_eq!(config.expected_password.as_deref(), Some("pw"));
        assert_eq!(config.expected_username.as_deref(), Some("user"));
        assert_eq!(config.auth_realm, DEFAULT_AUTH_REALM);
        assert!(config.client_gate_password.is_none());
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("APP_PASSWORD", Some("from-env")),
                ("APP_USERNAME", None),
                ("APP_AUTH_REALM", Some("EnvRealm")),
                ("VITE_APP_PASSWORD", None),
            ],
            || {
                let config = GateConfig::from_env();
                assert_eq!(config.expected_password.as_deref(), Some("from-env"));
                assert!(config.expected_username.is_none());
                assert_eq!(config.auth_realm, "EnvRealm");
                assert!(!config.client_gate_enabled());
            },
        );
    }

    #[test]
    fn test_validate_rejects_quoted_realm() {
        let config = GateConfig::default().with_realm(r#"bad"realm"#);
        assert!(matches!(config.validate(), Err(GateError::ConfigError(_))));
    }

    #[test]
    fn test_validate_accepts_default() {
        assert!(GateConfig::default().validate().is_ok());
    }
}
