use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, Result};

/// Settings read from `config.toml`. Every field is optional in the file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub start_path: String,
    pub download_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub ssh_program: String,
    pub ssh_args: Vec<String>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_path: "/".to_string(),
            download_dir: None,
            request_timeout_secs: 30,
            ssh_program: "ssh".to_string(),
            ssh_args: Vec::new(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Configured download directory, or the working directory.
    pub fn download_dir(&self) -> Result<PathBuf> {
        match &self.download_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Configured log directory, or `<cache_dir>/wander`.
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|dir| dir.join("wander"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }
}

/// Locates and loads the settings file
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Load from the default location
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::with_path(config_path)
    }

    /// Load from a custom path (`--config`, tests)
    pub fn with_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref().to_path_buf();
        let settings = Self::load_settings_from_path(&config_path)?;

        Ok(Self {
            config_path,
            settings,
        })
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            AppError::ConfigError("Could not determine the config directory".to_string())
        })?;
        Ok(config_dir.join("wander").join("config.toml"))
    }

    fn load_settings_from_path(config_path: &Path) -> Result<Settings> {
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(config_path)
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}
