//! Configuration loading and database path resolution

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Environment variable naming the database file
pub const DATABASE_ENV_VAR: &str = "GALLERYINFO_DATABASE";

/// File name used under the default data directory
pub const DEFAULT_DATABASE_FILE: &str = "galleryinfo.db";

/// Database path resolution, in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`database = "..."`)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_database_path(cli_arg: Option<&Path>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = config_file_path().and_then(|p| database_from_config(&p).ok()) {
        return path;
    }

    // Priority 4: OS-dependent compiled default
    default_database_path()
}

/// Read the `database` key from a TOML config file
pub fn database_from_config(config_path: &Path) -> Result<PathBuf> {
    let content = std::fs::read_to_string(config_path)?;
    let config = toml::from_str::<toml::Value>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", config_path.display(), e)))?;

    config
        .get("database")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .ok_or_else(|| {
            Error::Config(format!("{}: missing \"database\" key", config_path.display()))
        })
}

/// First existing config file: user config dir, then /etc on unix
fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("galleryinfo").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/galleryinfo/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// `<local data dir>/galleryinfo/galleryinfo.db`
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("galleryinfo"))
        .unwrap_or_else(|| PathBuf::from("./galleryinfo_data"))
        .join(DEFAULT_DATABASE_FILE)
}
