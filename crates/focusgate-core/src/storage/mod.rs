mod database;
mod settings_store;

pub use database::{
    Database, KV_ENGINE_SNAPSHOT, KV_FEATURE_USAGE, KV_UNLOCK_STATE, KV_USAGE_STATS,
};
pub use settings_store::{get_value, set_value, SettingsStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/focusgate[-dev]/` based on FOCUSGATE_ENV.
///
/// Set FOCUSGATE_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSGATE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusgate-dev")
    } else {
        base_dir.join("focusgate")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
