//! Persistent desk configuration model and file-backed manager.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default seconds between unread-count polls.
fn default_poll_interval_secs() -> u64 {
    30
}

/// Default seconds before a failed load is replayed.
fn default_retry_delay_secs() -> u64 {
    5
}

/// Default display seconds for critical toasts.
fn default_toast_critical_secs() -> u64 {
    10
}

/// Default display seconds for every other toast.
fn default_toast_default_secs() -> u64 {
    8
}

/// Represents the desk configuration persisted on disk, covering the polling
/// cadence, retry delay and toast display times.
#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DeskConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_toast_critical_secs")]
    pub toast_critical_secs: u64,
    #[serde(default = "default_toast_default_secs")]
    pub toast_default_secs: u64,
}

impl Default for DeskConfig {
    /// Returns baseline config when no persisted settings are available.
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            retry_delay_secs: default_retry_delay_secs(),
            toast_critical_secs: default_toast_critical_secs(),
            toast_default_secs: default_toast_default_secs(),
        }
    }
}

impl DeskConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn toast_critical_duration(&self) -> Duration {
        Duration::from_secs(self.toast_critical_secs)
    }

    pub fn toast_default_duration(&self) -> Duration {
        Duration::from_secs(self.toast_default_secs)
    }

    /// Copy with zero intervals raised to one second. A zero-period ticker
    /// panics at runtime.
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        for value in [
            &mut config.poll_interval_secs,
            &mut config.retry_delay_secs,
            &mut config.toast_critical_secs,
            &mut config.toast_default_secs,
        ] {
            if *value == 0 {
                *value = 1;
            }
        }
        config
    }
}

/// Manages loading and saving of the desk configuration to a JSON file in the
/// platform-specific config directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Creates a manager bound to the platform-specific app config path.
    pub fn new() -> Self {
        let dirs = directories::ProjectDirs::from("mx", "nexo", "nexo-desk")
            .expect("Could not determine config directory");
        let path = dirs.config_dir().join("config.json");
        Self { path }
    }

    /// Loads config from disk, falling back to defaults on read/parse errors.
    pub fn load(&self) -> DeskConfig {
        if self.path.exists() {
            let content = fs::read_to_string(&self.path).unwrap_or_default();
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            DeskConfig::default()
        }
    }

    /// Persists config to disk, creating parent directories when needed.
    pub fn save(&self, config: &DeskConfig) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
