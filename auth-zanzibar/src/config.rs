//! Authorization store configuration.

use std::fmt;
use std::time::Duration;

use crate::error::{AuthzError, Result};

#[derive(Clone)]
pub struct AuthzConfig {
    /// Use the live OpenFGA client instead of the no-op store.
    pub enabled: bool,
    /// OpenFGA API base URL, e.g. `http://localhost:8080`.
    pub api_url: String,
    /// Bearer token sent with every request.
    pub api_token: Option<String>,
    /// Store looked up (or created) by name when `store_id` is not set.
    pub store_name: String,
    pub store_id: Option<String>,
    /// Model used for checks; the latest model of the store when not set.
    pub model_id: Option<String>,
    /// JSON authorization model uploaded when the store has none.
    pub model_file_path: String,
    pub request_timeout: Duration,
    pub page_size: u32,
    /// Tuples per write request. Each request is applied all-or-nothing.
    pub max_tuples_per_write: usize,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: String::new(),
            api_token: None,
            store_name: "heureka".to_string(),
            store_id: None,
            model_id: None,
            model_file_path: "authz/model.json".to_string(),
            request_timeout: Duration::from_secs(30),
            page_size: 100,
            max_tuples_per_write: 100,
        }
    }
}

impl AuthzConfig {
    /// Create a configuration from `AUTHZ_*` environment variables.
    ///
    /// # Errors
    ///
    /// Fails when a variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(enabled) = std::env::var("AUTHZ_ENABLED") {
            config.enabled = parse_bool("AUTHZ_ENABLED", &enabled)?;
        }
        if let Ok(url) = std::env::var("AUTHZ_FGA_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        config.api_token = non_empty_var("AUTHZ_FGA_API_TOKEN");
        if let Some(name) = non_empty_var("AUTHZ_FGA_STORE_NAME") {
            config.store_name = name;
        }
        config.store_id = non_empty_var("AUTHZ_FGA_STORE_ID");
        config.model_id = non_empty_var("AUTHZ_FGA_MODEL_ID");
        if let Some(path) = non_empty_var("AUTHZ_MODEL_FILE_PATH") {
            config.model_file_path = path;
        }
        if let Some(secs) = parse_var::<u64>("AUTHZ_REQUEST_TIMEOUT_SECONDS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = parse_var::<u32>("AUTHZ_PAGE_SIZE")? {
            config.page_size = size;
        }
        if let Some(max) = parse_var::<usize>("AUTHZ_MAX_TUPLES_PER_WRITE")? {
            config.max_tuples_per_write = max;
        }

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Fails on zero page or chunk sizes, or when enabled without an endpoint.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(AuthzError::Configuration("AUTHZ_PAGE_SIZE must be positive".to_string()));
        }
        if self.max_tuples_per_write == 0 {
            return Err(AuthzError::Configuration(
                "AUTHZ_MAX_TUPLES_PER_WRITE must be positive".to_string(),
            ));
        }
        if self.enabled && self.api_url.is_empty() {
            return Err(AuthzError::Configuration(
                "AUTHZ_FGA_API_URL is required when AUTHZ_ENABLED is set".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for AuthzConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthzConfig")
            .field("enabled", &self.enabled)
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "**********"))
            .field("store_name", &self.store_name)
            .field("store_id", &self.store_id)
            .field("model_id", &self.model_id)
            .field("model_file_path", &self.model_file_path)
            .field("request_timeout", &self.request_timeout)
            .field("page_size", &self.page_size)
            .field("max_tuples_per_write", &self.max_tuples_per_write)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match non_empty_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AuthzError::Configuration(format!("{name} has an invalid value: {raw}"))),
        None => Ok(None),
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(AuthzError::Configuration(format!("{name} must be a boolean, got {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid_and_disabled() {
        let config = AuthzConfig::default();
        assert!(!config.enabled);
        assert!(config.validate().is_ok());
        assert_eq!(config.max_tuples_per_write, 100);
    }

    #[test]
    fn test_enabled_requires_endpoint() {
        let config = AuthzConfig {
            enabled: true,
            ..AuthzConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuthzError::Configuration(_))));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = AuthzConfig {
            api_token: Some("super-secret".to_string()),
            ..AuthzConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("**********"));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }
}
