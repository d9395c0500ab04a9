mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DisplayConfig, RemindersConfig};
pub use database::HabitDb;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the habitloop data directory, creating it if needed.
///
/// `HABITLOOP_DATA_DIR` wins when set. Otherwise `~/.config/habitloop[-dev]/`
/// based on `HABITLOOP_ENV` (set it to `dev` for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HABITLOOP_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HABITLOOP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitloop-dev")
            } else {
                base_dir.join("habitloop")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
