// Client configuration, layered from defaults and the environment

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://sandbox.thetravelhunters.com";
pub const DEFAULT_USER_AGENT: &str = "TravelHunt-Web-App";
pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Environment prefix, e.g. `TRAVELHUNT_BASE_URL`.
pub const ENV_PREFIX: &str = "TRAVELHUNT_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Base URL cannot be used as a base: {0}")]
    UnsupportedBaseUrl(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
    /// Key for the hosted text-generation model used by the chat assistant.
    pub assistant_api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            assistant_api_key: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Load the client config: built-in defaults, then `TRAVELHUNT_*` variables.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(ClientConfig::default()))
        .merge(Env::prefixed(ENV_PREFIX));

    let config: ClientConfig = figment.extract()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_match_sandbox() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://sandbox.thetravelhunters.com");
        assert_eq!(config.timeout_ms, 300_000);
        assert_eq!(config.user_agent, "TravelHunt-Web-App");
        assert!(config.assistant_api_key.is_none());
    }

    #[test]
    fn test_load_config_without_env_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = load_config().map_err(|e| e.to_string())?;
            assert_eq!(config, ClientConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("TRAVELHUNT_BASE_URL", "http://localhost:8000");
            jail.set_env("TRAVELHUNT_TIMEOUT_MS", "2500");
            jail.set_env("TRAVELHUNT_ASSISTANT_API_KEY", "secret");

            let config = load_config().map_err(|e| e.to_string())?;
            assert_eq!(config.base_url, "http://localhost:8000");
            assert_eq!(config.timeout_ms, 2500);
            assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
            assert_eq!(config.assistant_api_key.as_deref(), Some("secret"));
            Ok(())
        });
    }

    #[test]
    fn test_bad_timeout_is_reported() {
        Jail::expect_with(|jail| {
            jail.set_env("TRAVELHUNT_TIMEOUT_MS", "soon");
            assert!(matches!(load_config(), Err(ConfigError::Figment(_))));
            Ok(())
        });
    }
}
