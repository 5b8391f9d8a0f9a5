use crate::core::scheduler::WeeklySchedule;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use chrono::{FixedOffset, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str = "https://www.halla.ac.kr/kr/211/subview.do";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_seconds: 30,
            user_agent: concat!("halla-bob/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "halla_cafeteria.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec![
                "https://halla-bob.vercel.app".to_string(),
                "*".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enabled: bool,
    /// Three-letter weekday, e.g. `mon`.
    pub weekday: String,
    pub hour: u32,
    pub minute: u32,
    pub utc_offset_hours: i32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        // Monday 06:00 Korea Standard Time
        Self {
            enabled: true,
            weekday: "mon".to_string(),
            hour: 6,
            minute: 0,
            utc_offset_hours: 9,
        }
    }
}

impl ScheduleConfig {
    pub fn weekday(&self) -> Result<Weekday> {
        self.weekday
            .parse::<Weekday>()
            .map_err(|_| EtlError::InvalidConfigValue {
                field: "schedule.weekday".to_string(),
                value: self.weekday.clone(),
                reason: "Expected a weekday such as mon, tue, ... sun".to_string(),
            })
    }

    pub fn to_schedule(&self) -> Result<WeeklySchedule> {
        validate_range("schedule.utc_offset_hours", self.utc_offset_hours, -12, 14)?;
        let offset = FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            EtlError::InvalidConfigValue {
                field: "schedule.utc_offset_hours".to_string(),
                value: self.utc_offset_hours.to_string(),
                reason: "Offset out of range".to_string(),
            }
        })?;
        WeeklySchedule::new(self.weekday()?, self.hour, self.minute, offset)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when it exists, otherwise falls back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::from_file(path)
        } else {
            tracing::debug!(
                "No configuration file at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::Internal {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ConfigProvider for AppConfig {
    fn source_url(&self) -> &str {
        &self.source.url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds)
    }

    fn user_agent(&self) -> &str {
        &self.source.user_agent
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("source.url", &self.source.url)?;
        validate_positive_number("source.timeout_seconds", self.source.timeout_seconds, 1)?;
        validate_path("storage.database_path", &self.storage.database_path)?;
        validate_non_empty_string("server.host", &self.server.host)?;
        for origin in &self.server.allowed_origins {
            if origin != "*" {
                validate_url("server.allowed_origins", origin)?;
            }
        }
        self.schedule.to_schedule()?;
        Ok(())
    }
}
