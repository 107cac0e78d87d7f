use std::path::{Path, PathBuf};

use crate::{app_dirs, atomic_file};

use super::{AppSettings, CONFIG_FILE_NAME, ConfigError};

/// Resolve the settings file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load settings from the app directory, returning defaults if the file is missing.
pub fn load_or_default() -> Result<AppSettings, ConfigError> {
    load_from_path(&config_path()?)
}

/// Load settings from a specific file; a missing file yields defaults.
pub fn load_from_path(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        return Ok(AppSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist settings to the app directory.
pub fn save(settings: &AppSettings) -> Result<(), ConfigError> {
    save_to_path(settings, &config_path()?)
}

/// Write settings as TOML to `path`, replacing the file atomically.
pub fn save_to_path(settings: &AppSettings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_file::write_atomic(path, data.as_bytes()).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
