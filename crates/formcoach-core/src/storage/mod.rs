mod config;
pub mod database;

pub use config::{Config, LogConfig, SpeechConfig, VoiceConfig};
pub use database::{Database, UserProfile};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/formcoach[-dev]/` based on FORMCOACH_ENV.
///
/// Set FORMCOACH_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FORMCOACH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("formcoach-dev")
    } else {
        base_dir.join("formcoach")
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
