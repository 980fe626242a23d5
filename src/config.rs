//! Configuration loader and validator for the homework status bot.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Settings file schema. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct App {
    pub poll_interval_secs: u64,
    pub endpoint: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// Credentials read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Secrets {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub secrets: Secrets,
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.app.poll_interval_secs)
    }

    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.app.endpoint).map_err(|_| ConfigError::Invalid("app.endpoint must be a valid URL"))
    }
}

/// Check that every required variable is present and non-blank.
/// All missing names are reported at once.
pub fn check_tokens<F>(lookup: F) -> Result<Secrets, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = Vec::new();
    let mut get = |name: &'static str| match lookup(name) {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            missing.push(name);
            String::new()
        }
    };
    let practicum_token = get(PRACTICUM_TOKEN);
    let telegram_token = get(TELEGRAM_TOKEN);
    let telegram_chat_id = get(TELEGRAM_CHAT_ID);
    if !missing.is_empty() {
        return Err(ConfigError::Missing(missing));
    }
    Ok(Secrets {
        practicum_token,
        telegram_token,
        telegram_chat_id: telegram_chat_id.trim().to_string(),
    })
}

/// Load settings and secrets.
/// - If `path` is None, `config.yaml` in the working directory is used when it exists,
///   otherwise defaults apply.
/// - An explicit `path` must exist.
pub fn load<F>(path: Option<&Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let settings = match path {
        Some(p) => read_settings(p)?,
        None => {
            let default = Path::new("config.yaml");
            if default.exists() {
                read_settings(default)?
            } else {
                Settings::default()
            }
        }
    };
    let secrets = check_tokens(lookup)?;
    let cfg = Config {
        app: settings.app,
        secrets,
    };
    validate(&cfg)?;
    Ok(cfg)
}

/// Process environment lookup for [`load`] and [`check_tokens`].
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.poll_interval_secs == 0 {
        return Err(ConfigError::Invalid("app.poll_interval_secs must be > 0"));
    }
    cfg.endpoint()?;
    Ok(())
}

/// Example settings file.
pub fn example() -> &'static str {
    r#"app:
  poll_interval_secs: 600
  endpoint: "https://practicum.yandex.ru/api/user_api/homework_statuses/"
"#
}
