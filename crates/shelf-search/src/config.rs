//! Search configuration
//!
//! Everything the pipeline needs is passed in through [`ShelfConfig`];
//! nothing is read from ambient state after construction.

use crate::error::ConfigError;
use crate::types::SearchType;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default debounce quiet period
pub const DEFAULT_QUIET_MS: u64 = 300;

/// Default request timeout
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Default endpoint base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000/";

/// Default autocomplete path, relative to the base URL
pub const DEFAULT_ENDPOINT: &str = "api/autocomplete";

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "SHELF_API_URL";

/// Environment variable carrying the bearer token
pub const ENV_API_TOKEN: &str = "SHELF_API_TOKEN";

/// Upper bound on the quiet period
const MAX_QUIET_MS: u64 = 10_000;

/// Shelf configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    /// Endpoint base URL
    pub base_url: String,
    /// Autocomplete path joined onto the base URL
    pub endpoint: String,
    /// Optional bearer token
    pub api_token: Option<String>,
    /// Debounce quiet period in milliseconds
    pub quiet_ms: u64,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Initial search type
    pub search_type: SearchType,
}

impl ShelfConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// - `ConfigError::Toml` if the text is not valid TOML for this schema
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Toml` if it cannot be parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Apply environment overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.api_token = Some(token);
        }
        self
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// With debounce quiet period
    #[inline]
    #[must_use]
    pub fn with_quiet_ms(mut self, quiet_ms: u64) -> Self {
        self.quiet_ms = quiet_ms;
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// With search type
    #[inline]
    #[must_use]
    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    /// Debounce quiet period
    #[inline]
    #[must_use]
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_ms)
    }

    /// Request timeout
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Absolute autocomplete URL
    ///
    /// The base is treated as a directory, so `http://host/shop` and
    /// `http://host/shop/` both resolve to `http://host/shop/api/autocomplete`.
    ///
    /// # Errors
    /// - `ConfigError::InvalidBaseUrl` if the base is not absolute http(s)
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };

        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }

        base.join(self.endpoint.trim_start_matches('/'))
            .map_err(|e| invalid(e.to_string()))
    }

    /// Validate configuration
    ///
    /// # Errors
    /// - `ConfigError::InvalidBaseUrl` for an unusable base URL
    /// - `ConfigError::InvalidValue` for out-of-range durations
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url()?;

        if self.quiet_ms > MAX_QUIET_MS {
            return Err(ConfigError::InvalidValue {
                field: "quiet_ms",
                reason: format!("{} exceeds {MAX_QUIET_MS}", self.quiet_ms),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            quiet_ms: DEFAULT_QUIET_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            search_type: SearchType::Title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = ShelfConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.quiet_period(), Duration::from_millis(300));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn endpoint_url_joins_base_as_directory() {
        let config = ShelfConfig::new().with_base_url("http://shop.test/store");
        assert_eq!(
            config.endpoint_url().unwrap().as_str(),
            "http://shop.test/store/api/autocomplete"
        );

        let config = ShelfConfig::new().with_base_url("http://shop.test:4000/");
        assert_eq!(
            config.endpoint_url().unwrap().as_str(),
            "http://shop.test:4000/api/autocomplete"
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        let config = ShelfConfig::new().with_base_url("ftp://shop.test");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        let config = ShelfConfig::new().with_base_url("not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout_but_allows_zero_quiet_period() {
        let config = ShelfConfig::new().with_request_timeout_ms(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                ..
            })
        ));

        assert!(ShelfConfig::new().with_quiet_ms(0).validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let config = ShelfConfig::from_toml_str(
            r#"
            base_url = "https://books.test/"
            quiet_ms = 150
            search_type = "author"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://books.test/");
        assert_eq!(config.quiet_ms, 150);
        assert_eq!(config.search_type, SearchType::Author);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_ms = 2500").unwrap();

        let config = ShelfConfig::load(file.path()).unwrap();
        assert_eq!(config.request_timeout_ms, 2500);

        let missing = ShelfConfig::load("/definitely/not/here.toml");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn env_overrides_apply() {
        let config = ShelfConfig::new().with_overrides_from(|key| match key {
            ENV_BASE_URL => Some("http://override.test/".to_string()),
            ENV_API_TOKEN => Some("secret".to_string()),
            _ => None,
        });

        assert_eq!(config.base_url, "http://override.test/");
        assert_eq!(config.api_token.as_deref(), Some("secret"));

        let untouched = ShelfConfig::new().with_overrides_from(|_| Some("  ".to_string()));
        assert_eq!(untouched, ShelfConfig::new());
    }
}
