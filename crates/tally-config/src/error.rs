use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error in {}: {message}", .path.display())]
    Serde { path: PathBuf, message: String },

    #[error("Invalid date format `{0}`")]
    InvalidDateFormat(String),
}
