//! Game configuration.
//!
//! Read from `sherlock-bia.toml` in the platform config directory. A
//! missing or broken file means defaults.

use crate::game::{LocalHints, RetryingHints, Rules};
use crate::store::STORAGE_KEY;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "sherlock-bia.toml";

/// Configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Storage ===
    /// Where progress and logs live (None = platform data dir)
    pub data_dir: Option<PathBuf>,
    /// Key of the progress document
    pub storage_key: String,
    /// External case catalog (None = built-in cases)
    pub catalog_path: Option<PathBuf>,
    /// Log file name inside the data dir
    pub log_file: String,

    // === Timing ===
    /// Timer tick interval in milliseconds
    pub tick_millis: u64,

    // === Economy ===
    pub power_up_cost: u32,
    pub power_up_seconds: i64,

    // === Hints ===
    pub hint_max_attempts: u32,
    pub hint_base_delay_millis: u64,

    // === Player ===
    /// Name used when starting fresh
    pub player_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: STORAGE_KEY.to_string(),
            catalog_path: None,
            log_file: "sherlock-bia.log".to_string(),

            tick_millis: 1000,

            power_up_cost: 3,
            power_up_seconds: 60,

            hint_max_attempts: 3,
            hint_base_delay_millis: 1000,

            player_name: "Bia".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "sherlock-bia", "Sherlock Bia")
}

/// Where a loaded config came from. Loading can run before logging is
/// set up, so the outcome is kept and logged later with [`ConfigSource::log`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    NoConfigDir,
    Unreadable { path: PathBuf, error: String },
    Invalid { path: PathBuf, error: String },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Missing(path) => {
                info!("Config file {} not found, using defaults", path.display())
            }
            ConfigSource::NoConfigDir => {
                warn!("No config directory on this platform, using defaults")
            }
            ConfigSource::Unreadable { path, error } => {
                warn!("Failed to read config file {}: {error}", path.display())
            }
            ConfigSource::Invalid { path, error } => {
                warn!("Failed to parse config file {}: {error}", path.display())
            }
        }
    }
}

impl GameConfig {
    /// Load from the default location, clamped. The source is returned
    /// unlogged.
    pub fn load() -> (Self, ConfigSource) {
        match Self::config_path() {
            Some(path) => Self::read(&path),
            None => (Self::default(), ConfigSource::NoConfigDir),
        }
    }

    /// Load from a specific path.
    /// Returns defaults if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let (config, source) = Self::read(path.as_ref());
        source.log();
        config
    }

    fn read(path: &Path) -> (Self, ConfigSource) {
        if !path.exists() {
            return (Self::default(), ConfigSource::Missing(path.to_path_buf()));
        }

        let (mut config, source) = match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<GameConfig>(&contents) {
                Ok(config) => (config, ConfigSource::File(path.to_path_buf())),
                Err(e) => (
                    Self::default(),
                    ConfigSource::Invalid {
                        path: path.to_path_buf(),
                        error: e.to_string(),
                    },
                ),
            },
            Err(e) => (
                Self::default(),
                ConfigSource::Unreadable {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                },
            ),
        };
        config.validate();
        (config, source)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// The data directory: the override, the platform data dir, or `.`
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join(&self.log_file)
    }

    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        if self.storage_key.trim().is_empty() {
            self.storage_key = STORAGE_KEY.to_string();
        }
        if self.player_name.trim().is_empty() {
            self.player_name = "Bia".to_string();
        }
        self.tick_millis = self.tick_millis.clamp(100, 10_000);
        self.power_up_cost = self.power_up_cost.clamp(1, 100);
        self.power_up_seconds = self.power_up_seconds.clamp(5, 600);
        self.hint_max_attempts = self.hint_max_attempts.clamp(1, 10);
        self.hint_base_delay_millis = self.hint_base_delay_millis.min(10_000);
    }

    pub fn rules(&self) -> Rules {
        Rules {
            power_up_cost: self.power_up_cost,
            power_up_seconds: self.power_up_seconds,
        }
    }

    /// Hint pipeline: the local source behind the retry policy
    pub fn hints(&self) -> RetryingHints {
        RetryingHints::new(
            Box::new(LocalHints),
            self.hint_max_attempts,
            Duration::from_millis(self.hint_base_delay_millis),
        )
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.storage_key, "sbia_state_v1_6");
        assert_eq!(config.power_up_cost, 3);
        assert_eq!(config.power_up_seconds, 60);
        assert_eq!(config.player_name, "Bia");
    }

    #[test]
    fn test_config_validation() {
        let mut config = GameConfig::default();
        config.tick_millis = 1;
        config.hint_max_attempts = 0;
        config.storage_key = "  ".to_string();

        config.validate();

        assert_eq!(config.tick_millis, 100);
        assert_eq!(config.hint_max_attempts, 1);
        assert_eq!(config.storage_key, STORAGE_KEY);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("sherlock-bia.toml");

        let mut config = GameConfig::default();
        config.player_name = "Ana".to_string();
        config.power_up_seconds = 30;
        config.data_dir = Some(temp_dir.path().to_path_buf());
        config.save_to(&path).expect("Failed to save config");

        let loaded = GameConfig::load_from(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_backfills_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("sherlock-bia.toml");
        fs::write(&path, "power_up_cost = 5\n").unwrap();

        let loaded = GameConfig::load_from(&path);
        assert_eq!(loaded.power_up_cost, 5);
        assert_eq!(loaded.tick_millis, 1000);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = GameConfig::load_from("/nonexistent/path/sherlock-bia.toml");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_broken_file_reports_its_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("sherlock-bia.toml");
        fs::write(&path, "power_up_cost = \"muitas\"\n").unwrap();

        let (config, source) = GameConfig::read(&path);
        assert_eq!(config, GameConfig::default());
        assert!(matches!(
            source,
            ConfigSource::Invalid { ref path, .. } if path.ends_with("sherlock-bia.toml")
        ));

        fs::write(&path, "tick_millis = 1\n").unwrap();
        let (config, source) = GameConfig::read(&path);
        assert_eq!(config.tick_millis, 100);
        assert_eq!(source, ConfigSource::File(path.clone()));

        let missing = temp_dir.path().join("nada.toml");
        assert_eq!(GameConfig::read(&missing).1, ConfigSource::Missing(missing.clone()));
    }
}
