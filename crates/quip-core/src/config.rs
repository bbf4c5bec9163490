use crate::error::{QuipError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const HOME_ENV: &str = "QUIP_HOME";
pub const DB_FILENAME: &str = "triggers.json";
pub const CONFIG_FILENAME: &str = "config.json";

/// Get the quip configuration directory
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = env::var(HOME_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    env::var("HOME")
        .map(|home| PathBuf::from(home).join(".quip"))
        .unwrap_or_else(|_| PathBuf::from(".quip"))
}

/// Get the path to the trigger database
pub fn get_db_file_path() -> PathBuf {
    get_config_dir().join(DB_FILENAME)
}

/// Get the path to the settings file
pub fn get_config_file_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILENAME)
}

/// Runtime settings of the engine.
///
/// Every field has a default, so a partial `config.json` only overrides
/// what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Inactivity after which the rolling buffer is discarded.
    pub buffer_timeout_ms: u64,
    /// Cadence of the background expiry sweep.
    pub sweep_interval_ms: u64,
    /// How long after a substitution incoming events still count as synthetic.
    pub settle_window_ms: u64,
    /// Pause between synthetic backspaces.
    pub keystroke_delay_ms: u64,
    /// Overrides the location of the trigger database.
    pub data_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            buffer_timeout_ms: 2000,
            sweep_interval_ms: 1000,
            settle_window_ms: 40,
            keystroke_delay_ms: 2,
            data_file: None,
        }
    }
}

impl Settings {
    /// Load settings from the default config file
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_file_path())
    }

    /// Load settings from `path`.
    ///
    /// A missing file yields the defaults. A file that cannot be parsed is
    /// reported and ignored; values that parse but make no sense are errors.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                log::warn!("Cannot read settings at {}: {}", path.display(), e);
                return Ok(Self::default());
            }
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Settings = match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "Ignoring malformed settings at {}: {}",
                    path.display(),
                    e
                );
                return Ok(Self::default());
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_timeout_ms == 0 {
            return Err(QuipError::InvalidConfig(
                "buffer_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.sweep_interval_ms == 0 {
            return Err(QuipError::InvalidConfig(
                "sweep_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn buffer_timeout(&self) -> Duration {
        Duration::from_millis(self.buffer_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }

    pub fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(self.keystroke_delay_ms)
    }

    /// Path of the trigger database, honouring the `data_file` override
    pub fn data_file_path(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(get_db_file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.buffer_timeout(), Duration::from_secs(2));
        assert_eq!(settings.sweep_interval(), Duration::from_secs(1));
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "buffer_timeout_ms": 500 }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.buffer_timeout_ms, 500);
        assert_eq!(settings.sweep_interval_ms, 1000);
        assert_eq!(settings.data_file, None);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "buffer_timeout_ms": 0 }"#).unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(QuipError::InvalidConfig(_))
        ));
    }

    #[test]
    fn data_file_override_wins() {
        let settings = Settings {
            data_file: Some(PathBuf::from("/tmp/elsewhere.json")),
            ..Settings::default()
        };
        assert_eq!(
            settings.data_file_path(),
            PathBuf::from("/tmp/elsewhere.json")
        );
    }
}
