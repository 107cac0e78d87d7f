//! Application directory helpers anchored to a single `.assetview` folder.
//!
//! Config and log files live under the OS config directory (e.g. `%APPDATA%`
//! on Windows, `~/.config` on Linux). `ASSETVIEW_CONFIG_HOME` replaces the
//! base directory for tests or portable installs.

use std::{
    path::PathBuf,
    sync::{LazyLock, Mutex},
};

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory that lives under the OS config root.
pub const APP_DIR_NAME: &str = ".assetview";
/// Environment variable that overrides the config base directory.
pub const CONFIG_HOME_ENV: &str = "ASSETVIEW_CONFIG_HOME";

static CONFIG_BASE_OVERRIDE: LazyLock<Mutex<Option<PathBuf>>> = LazyLock::new(|| Mutex::new(None));

/// Errors that can occur while resolving or preparing application directories.
#[derive(Debug, Error)]
pub enum AppDirError {
    /// No suitable base config directory could be resolved.
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    /// Failed to create the application directory.
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Return the root `.assetview` directory, creating it if needed.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = config_base_dir().ok_or(AppDirError::NoBaseDir)?;
    ensure_dir(base.join(APP_DIR_NAME))
}

/// Return the logs directory inside the `.assetview` root, creating it if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    ensure_dir(app_root_dir()?.join("logs"))
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    std::fs::create_dir_all(&path).map_err(|source| AppDirError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn config_base_dir() -> Option<PathBuf> {
    if let Some(path) = CONFIG_BASE_OVERRIDE
        .lock()
        .ok()
        .and_then(|guard| guard.clone())
    {
        return Some(path);
    }
    if let Ok(path) = std::env::var(CONFIG_HOME_ENV) {
        return Some(PathBuf::from(path));
    }
    BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Test guard that points the config base at a temporary directory.
#[cfg(test)]
pub(crate) struct ConfigBaseGuard {
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
impl ConfigBaseGuard {
    pub(crate) fn set(path: PathBuf) -> Self {
        static SERIAL: Mutex<()> = Mutex::new(());
        let lock = SERIAL.lock().unwrap_or_else(|err| err.into_inner());
        *CONFIG_BASE_OVERRIDE
            .lock()
            .unwrap_or_else(|err| err.into_inner()) = Some(path);
        Self { _lock: lock }
    }
}

#[cfg(test)]
impl Drop for ConfigBaseGuard {
    fn drop(&mut self) {
        *CONFIG_BASE_OVERRIDE
            .lock()
            .unwrap_or_else(|err| err.into_inner()) = None;
    }
}
