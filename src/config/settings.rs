//! Client settings and configuration management

use crate::error::{ClientError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable prefix for overrides, e.g. `NEGOTIATION_API__ENDPOINT__STAGE`
pub const ENV_PREFIX: &str = "NEGOTIATION_API";

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/client.yaml";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the deployed gateway lives and how to talk to it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deployment stage, appended to the base URL as one path segment
    #[serde(default)]
    pub stage: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Literal API key; never written back by [`Settings::save`]
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Name of an environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    30000
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

const LOG_FORMATS: &[&str] = &["json", "pretty", "compact"];

impl EndpointConfig {
    /// Create an endpoint configuration for a base URL with all other fields defaulted
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the deployment stage
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Root URL every route path is appended to
    pub fn root_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.stage.as_deref().map(|s| s.trim_matches('/')) {
            Some(stage) if !stage.is_empty() => format!("{}/{}", base, stage),
            _ => base.to_string(),
        }
    }

    /// Full URL for a route path
    pub fn invoke_url(&self, path: &str) -> String {
        format!("{}/{}", self.root_url(), path.trim_start_matches('/'))
    }

    /// Resolve the API key, preferring the environment variable when it is set
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

impl Settings {
    /// Load settings from `.env`, the default configuration file and environment variables
    pub fn load() -> Result<Self> {
        // A missing .env file is the common case
        let _ = dotenvy::dotenv();
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load settings from a specific configuration file (YAML or TOML by extension)
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let format = if path
            .extension()
            .map_or(false, |ext| ext == "yaml" || ext == "yml")
        {
            FileFormat::Yaml
        } else {
            FileFormat::Toml
        };

        let mut config_builder = Config::builder()
            .set_default("endpoint.base_url", default_base_url())?
            .set_default("endpoint.timeout_ms", default_timeout())?
            .set_default("endpoint.connect_timeout_ms", default_connect_timeout())?
            .set_default("endpoint.user_agent", default_user_agent())?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?;

        if path.exists() {
            config_builder = config_builder.add_source(File::from(path).format(format));
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = config_builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file, leaving out any literal API key
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(|e| {
            ClientError::Config(config::ConfigError::Message(format!(
                "Failed to serialize settings: {}",
                e
            )))
        })?;

        std::fs::write(path.as_ref(), content).map_err(|e| {
            ClientError::Config(config::ConfigError::Message(format!(
                "Failed to write settings: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let endpoint = &self.endpoint;

        if endpoint.base_url.trim().is_empty() {
            return Err(invalid("Endpoint base_url cannot be empty"));
        }
        let base_url = endpoint.base_url.as_str();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(invalid(format!(
                "Endpoint base_url '{}' must start with http:// or https://",
                endpoint.base_url
            )));
        }
        if let Some(stage) = &endpoint.stage {
            if stage.is_empty() || stage.contains('/') {
                return Err(invalid(format!(
                    "Endpoint stage '{}' must be a single non-empty path segment",
                    stage
                )));
            }
        }
        if endpoint.timeout_ms == 0 {
            return Err(invalid("Endpoint timeout_ms cannot be 0"));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(invalid(format!(
                "Unknown log format '{}', expected one of {:?}",
                self.logging.format, LOG_FORMATS
            )));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ClientError {
    ClientError::Config(config::ConfigError::Message(message.into()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stage: None,
            timeout_ms: default_timeout(),
            connect_timeout_ms: default_connect_timeout(),
            api_key: None,
            api_key_env: None,
            default_headers: BTreeMap::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
