use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::calendar::TrainingCalendar;
use crate::logging::LogConfig;
use crate::models::FIRST_WEEK;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    pub settings: AppSettings,

    /// Logging output
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Data directory path
    pub data_dir: PathBuf,

    /// Completion log file name inside `data_dir`
    pub completions_file: String,

    /// Any date in the first week of the plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_start: Option<NaiveDate>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            settings: AppSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            data_dir: AppConfig::default_config_dir(),
            completions_file: "completions.json".to_string(),
            training_start: None,
        }
    }
}

/// Keys accepted by [`AppConfig::get`] and [`AppConfig::set`]
pub const CONFIG_KEYS: [&str; 6] = [
    "settings.data_dir",
    "settings.completions_file",
    "settings.training_start",
    "logging.level",
    "logging.format",
    "logging.file_path",
];

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// `~/.marathon-tracker`
    pub fn default_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".marathon-tracker")
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Load the file at `path` (or the default path); a missing file yields defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Full path of the completion log
    pub fn completions_path(&self) -> PathBuf {
        self.settings.data_dir.join(&self.settings.completions_file)
    }

    /// Calendar anchored at the configured training start
    pub fn calendar(&self) -> Option<TrainingCalendar> {
        self.settings
            .training_start
            .map(TrainingCalendar::starting_week_of)
    }

    /// Plan week for `today`; week 1 until a training start is configured
    pub fn current_week(&self, today: NaiveDate) -> u8 {
        self.calendar()
            .map(|calendar| calendar.current_week(today))
            .unwrap_or(FIRST_WEEK)
    }

    /// Read a dotted configuration key
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "settings.data_dir" => self.settings.data_dir.display().to_string(),
            "settings.completions_file" => self.settings.completions_file.clone(),
            "settings.training_start" => self
                .settings
                .training_start
                .map(|date| date.to_string())
                .unwrap_or_default(),
            "logging.level" => self.logging.level.to_filter().to_string(),
            "logging.format" => format!("{:?}", self.logging.format).to_lowercase(),
            "logging.file_path" => self
                .logging
                .file_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            _ => bail!("Unknown configuration key: {}", key),
        };
        Ok(value)
    }

    /// Update a dotted configuration key; an empty value clears optional keys
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "settings.data_dir" => self.settings.data_dir = PathBuf::from(value),
            "settings.completions_file" => {
                if value.is_empty() {
                    bail!("settings.completions_file cannot be empty");
                }
                self.settings.completions_file = value.to_string();
            }
            "settings.training_start" => {
                self.settings.training_start = if value.is_empty() {
                    None
                } else {
                    Some(
                        NaiveDate::parse_from_str(value, "%Y-%m-%d")
                            .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", value))?,
                    )
                };
            }
            "logging.level" => {
                self.logging.level = value.parse().map_err(anyhow::Error::msg)?;
            }
            "logging.format" => {
                self.logging.format = value.parse().map_err(anyhow::Error::msg)?;
            }
            "logging.file_path" => {
                self.logging.file_path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            _ => bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }
}
