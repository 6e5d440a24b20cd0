//! Configuration management for the EmailBison node

use crate::constants::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::{BisonError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Credentials plus the handful of settings the node reads from its host.
///
/// Field aliases accept the host credential names (`serverUrl`, `apiToken`)
/// as well as the lowercased keys produced by environment layering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BisonConfig {
    #[serde(alias = "serverUrl", alias = "serverurl", default = "default_server_url")]
    pub server_url: String,

    #[serde(alias = "apiToken", alias = "apitoken", alias = "token", default)]
    pub api_token: String,

    #[serde(alias = "timeoutSecs", alias = "timeoutsecs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(alias = "continueOnFail", alias = "continueonfail", default)]
    pub continue_on_fail: bool,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for BisonConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            api_token: String::new(),
            timeout_secs: default_timeout_secs(),
            continue_on_fail: false,
        }
    }
}

impl BisonConfig {
    pub fn new(server_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            api_token: api_token.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BisonError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json_str(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BisonConfig = serde_json::from_str(json)
            .map_err(|e| BisonError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Layer an optional JSON credentials file under `EMAILBISON_*`
    /// environment variables (`EMAILBISON_SERVER_URL`, `EMAILBISON_API_TOKEN`, ...).
    ///
    /// Defaults come from the serde attributes. A file and the environment
    /// must agree on spelling (`server_url` vs `serverUrl`) for a key they both set.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            log::debug!("Reading credentials from {}", path.display());
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Json)
                    .required(true),
            );
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("EMAILBISON").try_parsing(true),
        );

        let config: BisonConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(BisonError::Config("EmailBison API token is required".to_string()));
        }

        let server = self.server_url.trim();
        if server.is_empty() {
            return Err(BisonError::Config("EmailBison server URL is required".to_string()));
        }

        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(BisonError::Config(format!(
                "EmailBison server URL must start with http:// or https://, got '{}'",
                server
            )));
        }

        if self.timeout_secs == 0 {
            return Err(BisonError::Config(
                "Request timeout must be at least one second".to_string(),
            ));
        }

        Ok(())
    }

    /// Base URL every request path is appended to: `{serverUrl}/api`
    pub fn api_base_url(&self) -> String {
        let server = self.server_url.trim().trim_end_matches('/');
        let server = server.strip_suffix("/api").unwrap_or(server);
        format!("{}/api", server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_url_is_normalized() {
        let mut config = BisonConfig::new("https://send.example.com/", "token");
        assert_eq!(config.api_base_url(), "https://send.example.com/api");

        config.server_url = "https://send.example.com/api/".to_string();
        assert_eq!(config.api_base_url(), "https://send.example.com/api");
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = BisonConfig::new("send.example.com", "token");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_default_timeout() {
        let config = BisonConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.continue_on_fail);
    }
}
