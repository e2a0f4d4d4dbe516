use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub nlu: NluConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for the NLU prediction endpoint. All three of
/// `endpoint`, `app_id` and `api_key` must be present for the recognizer
/// to be considered configured; the dialog degrades gracefully otherwise.
#[derive(Clone, Debug)]
pub struct NluConfig {
    pub endpoint: Option<String>,
    pub app_id: Option<String>,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

impl NluConfig {
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.app_id.is_some() && self.api_key.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nlu: NluConfig { endpoint: None, app_id: None, api_key: None, timeout_secs: 10 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    nlu: Option<NluPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct NluPatch {
    endpoint: Option<String>,
    app_id: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("wayfarer.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(nlu) = patch.nlu {
            if let Some(endpoint) = nlu.endpoint {
                self.nlu.endpoint = Some(endpoint);
            }
            if let Some(app_id) = nlu.app_id {
                self.nlu.app_id = Some(app_id);
            }
            if let Some(api_key_value) = nlu.api_key {
                self.nlu.api_key = Some(api_key_value.into());
            }
            if let Some(timeout_secs) = nlu.timeout_secs {
                self.nlu.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("WAYFARER_NLU_ENDPOINT") {
            self.nlu.endpoint = Some(value);
        }
        if let Some(value) = read_env("WAYFARER_NLU_APP_ID") {
            self.nlu.app_id = Some(value);
        }
        if let Some(value) = read_env("WAYFARER_NLU_API_KEY") {
            self.nlu.api_key = Some(value.into());
        }
        if let Some(value) = read_env("WAYFARER_NLU_TIMEOUT_SECS") {
            self.nlu.timeout_secs = parse_u64("WAYFARER_NLU_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("WAYFARER_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("WAYFARER_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.nlu.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "nlu.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation("logging.level must not be empty".to_string()));
        }
        Ok(())
    }

    /// Effective configuration for operator inspection, secrets redacted.
    pub fn redacted_summary(&self) -> String {
        let api_key = match &self.nlu.api_key {
            Some(secret) if !secret.expose_secret().is_empty() => "***redacted***",
            _ => "(unset)",
        };
        format!(
            "nlu.endpoint = {}\nnlu.app_id = {}\nnlu.api_key = {}\nnlu.timeout_secs = {}\nlogging.level = {}\nlogging.format = {:?}",
            self.nlu.endpoint.as_deref().unwrap_or("(unset)"),
            self.nlu.app_id.as_deref().unwrap_or("(unset)"),
            api_key,
            self.nlu.timeout_secs,
            self.logging.level,
            self.logging.format,
        )
    }
}

fn resolve_config_path(requested: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = requested {
        return path.exists().then(|| path.to_path_buf());
    }
    let default = PathBuf::from("wayfarer.toml");
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}
