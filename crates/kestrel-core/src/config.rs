use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const HOME_ENV: &str = "KESTREL_HOME";
pub const PROFILES_DIR_ENV: &str = "KESTREL_PROFILES_DIR";
pub const FROZEN_DIR_ENV: &str = "KESTREL_FROZEN_DIR";
pub const DATA_DIR_ENV: &str = "KESTREL_DATA_DIR";
pub const STORE_PATH_ENV: &str = "KESTREL_STORE_PATH";
pub const CONFIG_PATH_ENV: &str = "KESTREL_CONFIG_PATH";
pub const ENGINE_PATH_ENV: &str = "KESTREL_ENGINE_PATH";

/// Filesystem layout of an installation. Every location can be overridden
/// individually through its environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub home: PathBuf,
    pub profiles_dir: PathBuf,
    pub frozen_dir: PathBuf,
    pub data_dir: PathBuf,
    pub store_path: PathBuf,
    pub config_path: PathBuf,
}

impl Paths {
    /// Resolves the layout from the environment, defaulting to `~/.kestrel`.
    pub fn resolve() -> Result<Self> {
        let home = match env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .ok_or_else(|| {
                    Error::MissingDependency(format!(
                        "could not determine a home directory; set {HOME_ENV}"
                    ))
                })?
                .join(".kestrel"),
        };
        let mut paths = Self::under(&home);
        if let Some(dir) = env_path(PROFILES_DIR_ENV) {
            paths.profiles_dir = dir;
        }
        if let Some(dir) = env_path(FROZEN_DIR_ENV) {
            paths.frozen_dir = dir;
        }
        if let Some(dir) = env_path(DATA_DIR_ENV) {
            paths.data_dir = dir.clone();
            paths.store_path = dir.join("profiles.json");
            paths.config_path = dir.join("config.json");
        }
        if let Some(file) = env_path(STORE_PATH_ENV) {
            paths.store_path = file;
        }
        if let Some(file) = env_path(CONFIG_PATH_ENV) {
            paths.config_path = file;
        }
        Ok(paths)
    }

    /// Standard layout rooted at `home`.
    pub fn under(home: &Path) -> Self {
        let data_dir = home.join("data");
        Paths {
            home: home.to_path_buf(),
            profiles_dir: home.join("profiles"),
            frozen_dir: home.join("frozen"),
            store_path: data_dir.join("profiles.json"),
            config_path: data_dir.join("config.json"),
            data_dir,
        }
    }

    /// Creates the standard directories if they are missing.
    pub fn ensure_scaffolding(&self) -> Result<()> {
        fs::create_dir_all(&self.profiles_dir)?;
        fs::create_dir_all(&self.frozen_dir)?;
        fs::create_dir_all(&self.data_dir)?;
        if let Some(parent) = self.store_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Tool-wide settings shared by every profile, stored as JSON under the
/// data directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Engine binary to launch instead of auto-detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_path: Option<PathBuf>,
    /// Directory holding shared extensions, one entry per extension name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_root: Option<PathBuf>,
    /// Arguments appended to every launch.
    #[serde(default)]
    pub default_args: Vec<String>,
    /// Extra environment variables for process-spawned engines.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Reads the config file, treating a missing file as the default config.
pub async fn load_config(paths: &Paths) -> Result<AppConfig> {
    match tokio::fs::read(&paths.config_path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(e.into()),
    }
}

pub async fn save_config(paths: &Paths, config: &AppConfig) -> Result<()> {
    if let Some(parent) = paths.config_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(config)?;
    tokio::fs::write(&paths.config_path, json).await?;
    Ok(())
}
