//! User configuration, stored as TOML.
//!
//! Lookup order: an explicit path, then `<config dir>/chainmetrics/config.toml`,
//! then built-in defaults. `CHAINMETRICS_API_KEY` overrides the file's key.
//!
//! ```toml
//! [api]
//! api_key = "..."
//! timeout_secs = 60
//! retry_sleep_secs = 5
//!
//! [defaults]
//! coin = "eth"
//! period = "week"
//! ```

use crate::client::{DEFAULT_BASE_URL, DEFAULT_COIN};
use crate::error::ConfigError;
use crate::resolution::{Resolution, TimeBasis};
use crate::source::HttpConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `api.api_key`.
pub const API_KEY_ENV: &str = "CHAINMETRICS_API_KEY";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub defaults: DefaultSettings,
    pub chart: ChartSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub retry_sleep_secs: u64,
    pub max_attempts: u32,
    pub accepted_statuses: Vec<u16>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        let http = HttpConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: http.timeout.as_secs(),
            retry_sleep_secs: http.retry_sleep.as_secs(),
            max_attempts: http.max_attempts,
            accepted_statuses: http.accepted_statuses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    pub coin: String,
    pub period: Resolution,
    /// Fixed UTC offset for calendar dates; local time when unset.
    pub utc_offset_hours: Option<i32>,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            coin: DEFAULT_COIN.to_string(),
            period: Resolution::Daily,
            utc_offset_hours: None,
        }
    }
}

/// Figure defaults, in terminal cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub width: u16,
    pub height: u16,
    pub font_size: f32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 120,
            height: 36,
            font_size: 40.0,
        }
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// `<config dir>/chainmetrics/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chainmetrics").join("config.toml"))
    }

    /// Resolve settings from an explicit file, the default location, or
    /// defaults, then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api.api_key = Some(key);
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api.api_key.as_deref()
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(self.api.timeout_secs),
            retry_sleep: Duration::from_secs(self.api.retry_sleep_secs),
            max_attempts: self.api.max_attempts,
            accepted_statuses: self.api.accepted_statuses.clone(),
        }
    }

    pub fn time_basis(&self) -> Result<TimeBasis, ConfigError> {
        match self.defaults.utc_offset_hours {
            None => Ok(TimeBasis::Local),
            Some(hours) => TimeBasis::from_offset_hours(hours).ok_or_else(|| {
                ConfigError::Invalid(format!("utc_offset_hours {hours} is out of range"))
            }),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.max_attempts == 0 {
            return Err(ConfigError::Invalid("api.max_attempts must be at least 1".into()));
        }
        if self.api.accepted_statuses.is_empty() {
            return Err(ConfigError::Invalid(
                "api.accepted_statuses must list at least one status".into(),
            ));
        }
        self.time_basis()?;
        Ok(())
    }
}
