mod config;
pub mod database;

pub use config::{Config, ParserConfig, TimerConfig, UiConfig};
pub use database::{Database, SessionStats};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `TASKORBIT_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/taskorbit`, or `~/.config/taskorbit-dev` when
/// `TASKORBIT_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TASKORBIT_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TASKORBIT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("taskorbit-dev")
            } else {
                base_dir.join("taskorbit")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
