//! Configuration loading for feedbackhub.
//!
//! Values are layered with figment: built-in defaults, then a TOML file,
//! then `FEEDBACKHUB_` environment variables (nested keys split on `__`,
//! e.g. `FEEDBACKHUB_SERVER__PORT=8080`).

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::DEFAULT_DATA_FILE;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "feedbackhub.toml";

const ENV_PREFIX: &str = "FEEDBACKHUB_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub gui: GuiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the feedback array.
    pub data_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiConfig {
    /// Base URL of the feedback API the desktop app talks to.
    pub api_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:4000".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional TOML file, and the environment.
    ///
    /// A missing config file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a source fails to parse or the result is invalid.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(&config_file))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }
        if self.storage.data_file.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage.data_file must not be empty".to_string(),
            });
        }
        if !(self.gui.api_url.starts_with("http://") || self.gui.api_url.starts_with("https://")) {
            return Err(Error::ConfigValidation {
                message: format!("gui.api_url must be an http(s) URL, got {:?}", self.gui.api_url),
            });
        }
        Ok(())
    }

    /// Socket address the API binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.host` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| Error::ConfigValidation {
                message: format!("invalid server address {}:{}: {e}", self.server.host, self.server.port),
            })
    }
}
