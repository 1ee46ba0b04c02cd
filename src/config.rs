use crate::error::SyncError;
use crate::models::AccountBinding;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CREDENTIALS_FILE: &str = "credentials.json";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "remindsync", "remindsync")
}

fn default_data_dir() -> PathBuf {
    if let Some(dirs) = project_dirs() {
        return dirs.data_dir().to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".remindsync")
}

fn default_base_dir() -> PathBuf {
    if let Some(path) = std::env::var_os("TASK_SYNC_BASE_DIR") {
        return PathBuf::from(path);
    }
    default_data_dir()
}

pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("REMINDSYNC_CONFIG") {
        return PathBuf::from(path);
    }
    if let Some(dirs) = project_dirs() {
        return dirs.config_dir().join("config.toml");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".remindsync-config.toml")
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub connectivity: ConnectivityConfig,
    pub log: LogConfig,
    pub accounts: Vec<AccountBinding>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SyncConfig {
    pub base_dir: PathBuf,
    pub retry_count: u32,
    pub retry_delay_secs: u64,
    pub purge_on_remote_failure: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            retry_count: 5,
            retry_delay_secs: 60,
            purge_on_remote_failure: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ConnectivityConfig {
    pub probe_url: String,
    pub timeout_secs: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_url: "https://www.google.com".to_string(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl Config {
    /// Reads `config.toml`, falling back to defaults. A missing file is
    /// written out so there is a template to fill in.
    pub fn load() -> Self {
        let config_path = config_path();

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                eprintln!(
                    "Failed to parse config.toml ({config_path:?}), using defaults: {}",
                    e.message()
                );
                Config::default()
            }),
            Err(_) => Config::default(),
        };

        let changed = config.normalize_paths();
        if (changed || !config_path.exists())
            && let Err(e) = config.save_to_path(&config_path)
        {
            eprintln!("Could not write {config_path:?}: {e}");
        }

        if let Some(path) = std::env::var_os("TASK_SYNC_BASE_DIR") {
            config.sync.base_dir = PathBuf::from(path);
        }

        config
    }

    pub fn parse(content: &str) -> Result<Self, SyncError> {
        toml::from_str::<Config>(content).map_err(|e| SyncError::Config(e.to_string()))
    }

    pub fn save_to_path(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if self.accounts.is_empty() {
            return Err(SyncError::Config(format!(
                "No [[accounts]] configured in {}",
                config_path().display()
            )));
        }
        for binding in &self.accounts {
            if binding.email.trim().is_empty() || binding.list.trim().is_empty() {
                return Err(SyncError::Config(
                    "Every [[accounts]] entry needs both email and list".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.sync.retry_delay_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.connectivity.timeout_secs.max(1))
    }

    fn normalize_paths(&mut self) -> bool {
        let mut changed = false;

        if self.sync.base_dir.as_os_str().is_empty() {
            self.sync.base_dir = default_base_dir();
            changed = true;
        }

        if self.sync.base_dir.is_relative() {
            self.sync.base_dir = default_data_dir().join(&self.sync.base_dir);
            changed = true;
        }

        changed
    }
}

pub fn credentials_path(config: &Config) -> PathBuf {
    config.sync.base_dir.join(CREDENTIALS_FILE)
}

pub fn token_path(config: &Config, email: &str) -> PathBuf {
    config.sync.base_dir.join(format!("token_{email}.json"))
}
