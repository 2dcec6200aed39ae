//! Configuration module for the Capsuleer API service

mod frontend;
mod server;
mod session;
mod sso;

pub use frontend::FrontendConfig;
pub use server::ServerConfig;
pub use session::SessionConfig;
pub use sso::SsoConfig;

use capsuleer_common::config::ConfigLoader;
use capsuleer_common::ConfigurationError as ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for the Capsuleer API
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// EVE SSO (OAuth2 provider) configuration
    pub sso: SsoConfig,

    /// Session token configuration
    pub session: SessionConfig,

    /// Frontend redirect configuration
    pub frontend: FrontendConfig,
}

impl Config {
    /// Load configuration from file and environment, then validate it.
    ///
    /// Validation failures are fatal: the service must not start with a
    /// missing signing secret or SSO credentials.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_path {
            Some(path) => <Config as ConfigLoader<Config>>::load_from_file(path)?,
            None => <Config as ConfigLoader<Config>>::load(None)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Generate example configuration file
    pub fn generate_example() -> Result<String, ConfigError> {
        let config = Self::default();
        toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError {
            details: format!("Failed to serialize config: {e}"),
        })
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout)
    }

    /// Validate the assembled configuration
    ///
    /// The session signing secret is mandatory and has no default: an
    /// unset secret would let anyone forge session tokens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "session.secret".to_string(),
            });
        }
        if self.sso.client_id.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "sso.client_id".to_string(),
            });
        }
        if self.sso.client_secret.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "sso.client_secret".to_string(),
            });
        }
        if self.sso.callback_url.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "sso.callback_url".to_string(),
            });
        }

        Self::require_url("sso.callback_url", &self.sso.callback_url)?;
        Self::require_url("sso.authorize_url", &self.sso.authorize_url)?;
        Self::require_url("sso.token_url", &self.sso.token_url)?;
        Self::require_url("sso.verify_url", &self.sso.verify_url)?;
        Self::require_url("frontend.base_url", &self.frontend.base_url)?;

        Ok(())
    }

    fn require_url(key: &str, value: &str) -> Result<(), ConfigError> {
        url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            details: e.to_string(),
        })?;
        Ok(())
    }
}

impl ConfigLoader<Config> for Config {
    fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
        let figment = match path {
            Some(p) => Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file(p))
                .merge(Env::prefixed("CAPSULEER_API_").split("__")),
            None => Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file("capsuleer-api.toml"))
                .merge(Env::prefixed("CAPSULEER_API_").split("__")),
        };

        figment.extract().map_err(|e| ConfigError::ParseError {
            details: e.to_string(),
        })
    }

    fn load_from_file(path: &Path) -> Result<Config, ConfigError> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CAPSULEER_API_").split("__"));

        figment.extract().map_err(|e| ConfigError::ParseError {
            details: e.to_string(),
        })
    }

    fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<(), ConfigError> {
        let figment = Figment::from(Serialized::defaults(config.clone()))
            .merge(Env::prefixed(prefix).split("__"));

        *config = figment.extract().map_err(|e| ConfigError::ParseError {
            details: e.to_string(),
        })?;

        Ok(())
    }
}
