use std::{
    fs,
    path::{Path, PathBuf},
};

use tally_storage_json::write_atomic;
use tracing::debug;

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "config.json";

/// Reads and writes [`Config`] as a JSON file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Places the file at `<base>/config/config.json`.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir)?;
        Ok(Self::new(config_dir.join(CONFIG_FILE)))
    }

    /// Platform config directory, e.g. `~/.config/tally/config.json`.
    pub fn default_location() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tally")
            .join(CONFIG_FILE)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Missing file yields defaults. A present but invalid file is an error.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.config_path)?;
        let config: Config = serde_json::from_str(&data).map_err(|err| self.serde_error(err))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config).map_err(|err| self.serde_error(err))?;
        write_atomic(&self.config_path, json.as_bytes())?;
        debug!(path = %self.config_path.display(), "saved config");
        Ok(())
    }

    fn serde_error(&self, err: serde_json::Error) -> ConfigError {
        ConfigError::Serde {
            path: self.config_path.clone(),
            message: err.to_string(),
        }
    }
}
