mod config;
pub mod database;
mod progress;

pub use config::{ChallengesConfig, Config, CountdownConfig, NotificationsConfig};
pub use database::Database;
pub use progress::{MemoryStore, Progress, ProgressStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `MOVEIT_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/moveit[-dev]/`, with `MOVEIT_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MOVEIT_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MOVEIT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("moveit-dev")
            } else {
                base_dir.join("moveit")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
