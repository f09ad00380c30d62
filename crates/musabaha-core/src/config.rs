//! Configuration management for Musabaha admin tooling

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default backend host
pub const DEFAULT_BASE_URL: &str = "https://musabaha-home-ltd.onrender.com";

/// Environment variable prefix, nested keys separated by `__`
pub const ENV_PREFIX: &str = "MUSABAHA_ADMIN";

/// Configuration file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_NAME: &str = "musabaha-admin";

const REDACTED: &str = "********";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Polling watcher configuration
    #[serde(default)]
    pub watch: WatchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Host serving uploaded files, defaults to `base_url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_host: Option<String>,

    /// Per-request timeout in seconds, unset means the HTTP stack default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_seconds: Option<u64>,
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Bearer token for the subscriptions endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Credentials>,
}

/// Polling watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log to file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Bearer token used for authenticated endpoints
///
/// Debug output never includes the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(String);

impl Credentials {
    /// Wrap a bearer token, returning `None` for blank input
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// The raw token
    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credentials").field(&REDACTED).finish()
    }
}

// Default value functions
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_poll_interval() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            asset_host: None,
            request_timeout_seconds: None,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// With no path, an optional `musabaha-admin.toml` in the working
    /// directory is used. Environment variables such as
    /// `MUSABAHA_ADMIN__AUTH__TOKEN` override file values.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or the configuration
    /// cannot be parsed. Values are not validated here, so callers can apply
    /// their own overrides first and then call [`Config::validate`].
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        Self::load_with_env(path, None)
    }

    fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> crate::Result<Self> {
        let file = match path {
            Some(path) => config::File::new(&path.to_string_lossy(), config::FileFormat::Toml)
                .required(true),
            None => config::File::new(DEFAULT_CONFIG_NAME, config::FileFormat::Toml)
                .required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure or
    /// fails validation.
    pub fn from_toml_str(text: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| crate::Error::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML with the token redacted
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> crate::Result<String> {
        let mut redacted = self.clone();
        if redacted.auth.token.is_some() {
            redacted.auth.token = Some(Credentials(REDACTED.to_string()));
        }
        toml::to_string_pretty(&redacted).map_err(|e| crate::Error::configuration(e.to_string()))
    }

    /// Check values that serde cannot
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> crate::Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        if let Some(host) = &self.api.asset_host {
            validate_url("api.asset_host", host)?;
        }
        if self.api.request_timeout_seconds == Some(0) {
            return Err(crate::Error::validation(
                "api.request_timeout_seconds",
                "must be greater than zero",
            ));
        }
        if self.watch.poll_interval_seconds == 0 {
            return Err(crate::Error::validation(
                "watch.poll_interval_seconds",
                "must be greater than zero",
            ));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(crate::Error::validation(
                "logging.format",
                format!("expected json or pretty, got {}", self.logging.format),
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim().trim_end_matches('/')
    }

    /// Asset host without a trailing slash, falling back to the base URL
    #[must_use]
    pub fn asset_host(&self) -> &str {
        self.api
            .asset_host
            .as_deref()
            .map_or_else(|| self.base_url(), |host| host.trim().trim_end_matches('/'))
    }

    /// Credentials for authenticated endpoints, if configured
    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.auth.token.as_ref()
    }
}

fn validate_url(field: &str, value: &str) -> crate::Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(crate::Error::validation(field, "must not be empty"));
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(crate::Error::validation(
            field,
            format!("must be an http(s) URL, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert!(config.api.asset_host.is_none());
        assert!(config.api.request_timeout_seconds.is_none());
        assert!(config.auth.token.is_none());
        assert_eq!(config.watch.poll_interval_seconds, 30);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.logging.file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [api]
            base_url = "http://localhost:5000/"

            [watch]
            poll_interval_seconds = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url(), "http://localhost:5000");
        assert_eq!(config.asset_host(), "http://localhost:5000");
        assert_eq!(config.watch.poll_interval_seconds, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_asset_host_override() {
        let mut config = Config::default();
        config.api.asset_host = Some("https://cdn.example.com/".to_string());

        assert_eq!(config.asset_host(), "https://cdn.example.com");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(crate::Error::Validation { field, .. }) if field == "api.base_url"
        ));

        let mut config = Config::default();
        config.watch.poll_interval_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.request_timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_are_redacted() {
        let mut config = Config::default();
        config.auth.token = Credentials::bearer("secret-token");

        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));

        let rendered = config.to_toml_string().unwrap();
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains(REDACTED));
        assert_eq!(config.credentials().unwrap().token(), "secret-token");
    }

    #[test]
    fn test_blank_credentials_are_ignored() {
        assert!(Credentials::bearer("   ").is_none());
        assert_eq!(Credentials::bearer(" abc ").unwrap().token(), "abc");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [api]
            base_url = "http://127.0.0.1:9000"
            request_timeout_seconds = 10

            [auth]
            token = "file-token"

            [logging]
            format = "json"
            "#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.base_url(), "http://127.0.0.1:9000");
        assert_eq!(config.api.request_timeout_seconds, Some(10));
        assert_eq!(config.credentials().unwrap().token(), "file-token");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));

        assert!(matches!(result, Err(crate::Error::Configuration { .. })));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[watch]\npoll_interval_seconds = 60").unwrap();

        let env = config::Map::from([
            (
                "MUSABAHA_ADMIN__WATCH__POLL_INTERVAL_SECONDS".to_string(),
                "15".to_string(),
            ),
            (
                "MUSABAHA_ADMIN__AUTH__TOKEN".to_string(),
                "env-token".to_string(),
            ),
        ]);

        let config = Config::load_with_env(Some(file.path()), Some(env)).unwrap();

        assert_eq!(config.watch.poll_interval_seconds, 15);
        assert_eq!(config.credentials().unwrap().token(), "env-token");
    }

    #[test]
    fn test_invalid_file_is_loaded_then_fails_validation() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[api]\nbase_url = \"not-a-url\"").unwrap();

        let mut config = Config::load(Some(file.path())).unwrap();

        assert!(matches!(config.validate(), Err(crate::Error::Validation { .. })));

        config.api.base_url = "http://127.0.0.1:9000".to_string();
        assert!(config.validate().is_ok());
    }
}
