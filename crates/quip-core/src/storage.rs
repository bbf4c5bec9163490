use crate::error::{QuipError, Result};
use crate::models::TriggerMap;
use chrono::Local;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSON file holding the trigger database: a single object mapping each
/// trigger to its expansion.
#[derive(Debug, Clone)]
pub struct TriggerFile {
    path: PathBuf,
}

impl TriggerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all triggers. Never fails: a missing, unreadable or corrupt
    /// database yields an empty map. Corrupt files are moved aside first so
    /// a later save cannot overwrite them.
    pub fn load(&self) -> TriggerMap {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return TriggerMap::new(),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                log::warn!("Trigger database {} is not valid UTF-8", self.path.display());
                self.quarantine();
                return TriggerMap::new();
            }
            Err(e) => {
                log::warn!(
                    "Cannot read trigger database {}: {}",
                    self.path.display(),
                    e
                );
                return TriggerMap::new();
            }
        };

        // Handle empty database file
        if content.trim().is_empty() {
            return TriggerMap::new();
        }

        match serde_json::from_str(&content) {
            Ok(triggers) => triggers,
            Err(e) => {
                log::warn!(
                    "Trigger database {} is corrupt, starting empty: {}",
                    self.path.display(),
                    e
                );
                self.quarantine();
                TriggerMap::new()
            }
        }
    }

    /// Write all triggers, replacing the file atomically
    pub fn save(&self, triggers: &TriggerMap) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let serialized = serde_json::to_string_pretty(triggers)?;

        let mut file = NamedTempFile::new_in(&dir)?;
        file.write_all(serialized.as_bytes())?;
        file.flush()?;
        file.persist(&self.path)
            .map_err(|e| QuipError::Io(e.error))?;

        log::debug!(
            "Saved {} triggers to {}",
            triggers.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Path a corrupt database is moved to
    pub fn quarantine_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "triggers.json".to_string());
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        self.path.with_file_name(format!("{}.corrupt-{}", name, stamp))
    }

    fn quarantine(&self) {
        let aside = self.quarantine_path();
        match fs::rename(&self.path, &aside) {
            Ok(()) => log::warn!("Moved corrupt trigger database to {}", aside.display()),
            Err(e) => log::warn!(
                "Could not move corrupt trigger database {} aside: {}",
                self.path.display(),
                e
            ),
        }
    }
}
