use anyhow::{Context, Result};
use std::path::PathBuf;

/// Centralized path management for insert.
/// Directories are only created by the callers that write into them.

const APP_DIR: &str = "insert-source";
const DATABASE_FILE: &str = "drivers.json";

/// System-wide location of the driver database shipped by distribution packages.
pub const SYSTEM_DATABASE_PATH: &str = "/usr/share/insert-source/drivers.json";

/// Get the insert config directory
pub fn insert_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join(APP_DIR);
    Ok(config_dir)
}

/// Get the insert data directory
pub fn insert_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
            home.join(".local/share")
        })
        .join(APP_DIR)
}

/// Path of the TOML settings file
pub fn settings_file() -> Result<PathBuf> {
    Ok(insert_config_dir()?.join("config.toml"))
}

/// Path of the first-run state document
pub fn setup_state_file() -> Result<PathBuf> {
    Ok(insert_config_dir()?.join("config.json"))
}

/// Pick the driver database to load.
///
/// An explicit path always wins, then the per-user copy when present, then the
/// system-wide copy.
pub fn driver_database(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }

    let user_copy = insert_data_dir().join(DATABASE_FILE);
    if user_copy.exists() {
        return user_copy;
    }

    PathBuf::from(SYSTEM_DATABASE_PATH)
}
