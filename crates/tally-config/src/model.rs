use std::{env, path::PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Environment variable that overrides where records are stored.
pub const DATA_DIR_ENV: &str = "TALLY_DATA_DIR";

/// Stores user preferences for the tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// chrono format used for the display date stored on each transaction.
    #[serde(default = "Config::default_date_format")]
    pub date_format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for stored records. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Tracing directive used when `RUST_LOG` is unset, e.g. `tally=debug`.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "es-AR".into(),
            currency: "ARS".into(),
            date_format: Self::default_date_format(),
            data_dir: None,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn default_date_format() -> String {
        "%d/%m/%Y".into()
    }

    /// Directory holding the `categories` and `transactions` files.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }
        if let Some(path) = env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
            return PathBuf::from(path);
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("tally")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let broken = self.date_format.trim().is_empty()
            || StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error));
        if broken {
            return Err(ConfigError::InvalidDateFormat(self.date_format.clone()));
        }
        Ok(())
    }
}
