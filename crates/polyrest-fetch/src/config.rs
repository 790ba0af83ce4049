//! Client configuration.
//!
//! Configuration is read from a TOML file, optionally overridden by
//! environment variables, and validated once before a client is built. An
//! invalid configuration never produces a client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";

/// Environment variable overriding [`ClientConfig::api_key`].
pub const API_KEY_ENV: &str = "POLYREST_API_KEY";

/// Environment variable overriding [`ClientConfig::base_url`].
pub const BASE_URL_ENV: &str = "POLYREST_BASE_URL";

/// Configuration for the REST client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum number of requests admitted per window.
    pub rate_limit_count: u32,
    /// Length of the rate-limit window in seconds.
    pub rate_limit_window_seconds: u64,
    /// Retries after the first attempt for throttled or timed-out requests.
    pub max_retry_attempts: u32,
    /// Maximum number of pages fetched per sequence (0 disables the bound).
    pub max_pages: u32,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_seconds: 30,
            rate_limit_count: 100,
            rate_limit_window_seconds: 1,
            max_retry_attempts: 3,
            max_pages: 10_000,
            user_agent: format!("polyrest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

// The API key must never end up in logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("rate_limit_count", &self.rate_limit_count)
            .field("rate_limit_window_seconds", &self.rate_limit_window_seconds)
            .field("max_retry_attempts", &self.max_retry_attempts)
            .field("max_pages", &self.max_pages)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// One or more settings are invalid.
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

impl ClientConfig {
    /// Creates a default configuration with the given API key.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from TOML text. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads the default configuration file if it exists, or the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps variable names to values.
    ///
    /// Blank values are ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |name| lookup(name).filter(|value: &String| !value.trim().is_empty());
        if let Some(api_key) = present(API_KEY_ENV) {
            self.api_key = api_key;
        }
        if let Some(base_url) = present(BASE_URL_ENV) {
            self.base_url = base_url;
        }
        self
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Returns the rate-limit window.
    #[must_use]
    pub const fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_seconds)
    }

    /// Validates every setting, reporting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing each invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.api_key.trim().is_empty() {
            errors.push("api_key must not be empty".to_string());
        } else if reqwest::header::HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .is_err()
        {
            errors.push("api_key contains characters not allowed in an HTTP header".to_string());
        }

        if self.base_url.trim().is_empty() {
            errors.push("base_url must not be empty".to_string());
        } else {
            match reqwest::Url::parse(&self.base_url) {
                Ok(url) if url.cannot_be_a_base() => {
                    errors.push(format!("base_url `{}` cannot be a base URL", self.base_url));
                }
                Ok(url) if !matches!(url.scheme(), "http" | "https") => {
                    errors.push(format!("base_url scheme `{}` is not http(s)", url.scheme()));
                }
                Ok(_) => {}
                Err(e) => errors.push(format!("base_url `{}` is invalid: {e}", self.base_url)),
            }
        }

        if self.timeout_seconds == 0 {
            errors.push("timeout_seconds must be greater than 0".to_string());
        }
        if self.rate_limit_count == 0 {
            errors.push("rate_limit_count must be greater than 0".to_string());
        }
        if self.rate_limit_window_seconds == 0 {
            errors.push("rate_limit_window_seconds must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

/// Returns the platform config file location (e.g. `~/.config/polyrest/config.toml`).
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "polyrest", "polyrest")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.rate_limit_count, 100);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(1));
        assert_eq!(config.max_retry_attempts, 3);
        assert_eq!(config.max_pages, 10_000);
    }

    #[test]
    fn test_default_requires_api_key() {
        let err = ClientConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("api_key"));
        assert!(ClientConfig::with_api_key("key").validate().is_ok());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            timeout_seconds: 0,
            rate_limit_count: 0,
            rate_limit_window_seconds: 0,
            ..ClientConfig::default()
        };
        match config.validate() {
            Err(ConfigError::Invalid(errors)) => assert_eq!(errors.len(), 5),
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let config = ClientConfig {
            base_url: "ftp://example.com".to_string(),
            ..ClientConfig::with_api_key("key")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ClientConfig::from_toml_str(
            r#"
            api_key = "abc"
            rate_limit_count = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.rate_limit_count, 5);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(matches!(
            ClientConfig::from_toml_str("timeout_seconds = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_key = \"file-key\"\nmax_pages = 3\n").unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.max_pages, 3);

        let missing = ClientConfig::load(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::with_api_key("file-key").with_overrides(|name| match name {
            API_KEY_ENV => Some("env-key".to_string()),
            BASE_URL_ENV => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug = format!("{:?}", ClientConfig::with_api_key("secret-key"));
        assert!(!debug.contains("secret-key"));
    }
}
