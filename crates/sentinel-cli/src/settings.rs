use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

use sentinel_core::Config;
use tracing::info;

use crate::error::CliError;

const APP_DIR: &str = "sentinel";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "sentinel.log";

/// Where the effective configuration comes from, in lookup order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Flag(PathBuf),
    Env(PathBuf),
    UserDir(PathBuf),
    Builtin,
}

impl ConfigSource {
    pub fn resolve(
        flag: Option<PathBuf>,
        env: Option<OsString>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = flag {
            return Self::Flag(path);
        }
        if let Some(raw) = env.filter(|raw| !raw.is_empty()) {
            return Self::Env(PathBuf::from(raw));
        }
        match config_dir {
            Some(dir) => Self::UserDir(dir.join(APP_DIR).join(CONFIG_FILE)),
            None => Self::Builtin,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Flag(path) | Self::Env(path) | Self::UserDir(path) => Some(path.as_path()),
            Self::Builtin => None,
        }
    }

    /// Explicitly named files must exist; the per-user file is optional.
    pub fn load(&self) -> Result<Config, CliError> {
        let config = match self {
            Self::Flag(path) | Self::Env(path) => {
                if !path.is_file() {
                    return Err(CliError::MissingConfig(path.clone()));
                }
                Config::load(path)?
            }
            Self::UserDir(path) => Config::load_or_default(path)?,
            Self::Builtin => Config::default(),
        };
        match self.path() {
            Some(path) => info!(path = %path.display(), "configuration loaded"),
            None => info!("using built-in configuration"),
        }
        Ok(config)
    }
}

pub fn default_log_path(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LOG_FILE)
}

/// Routes `tracing` output to `log_path`; the terminal belongs to the console.
pub fn init_logging(log_path: &Path) -> Result<(), CliError> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| CliError::LogFile {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|source| CliError::LogFile {
            path: log_path.to_path_buf(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();

    Ok(())
}
