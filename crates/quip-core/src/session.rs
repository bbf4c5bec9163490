use crate::capture::{CaptureLoop, CaptureState};
use crate::config::Settings;
use crate::emitter::InputEmitter;
use crate::error::Result;
use crate::hook::KeyHook;
use crate::pipeline::Pipeline;
use crate::storage::TriggerFile;
use crate::store::TriggerStore;
use parking_lot::Mutex;

/// A running expander: the trigger store, where it is persisted, and the
/// capture loop reading it.
///
/// Edits made through [`Session::store`] are visible to the very next
/// keystroke.
pub struct Session {
    store: TriggerStore,
    file: TriggerFile,
    capture: Mutex<CaptureLoop>,
}

impl Session {
    /// Load the trigger database and start capturing.
    ///
    /// Fails when the hook cannot be installed; nothing keeps running then.
    pub fn open(
        settings: &Settings,
        hook: Box<dyn KeyHook>,
        emitter: Box<dyn InputEmitter>,
    ) -> Result<Self> {
        let file = TriggerFile::new(settings.data_file_path());
        let store = TriggerStore::from_map(file.load());
        log::info!(
            "Loaded {} triggers from {}",
            store.len(),
            file.path().display()
        );

        let pipeline = Pipeline::new(store.clone(), emitter, settings);
        let mut capture = CaptureLoop::new(pipeline, hook, settings);
        capture.start()?;

        Ok(Self {
            store,
            file,
            capture: Mutex::new(capture),
        })
    }

    pub fn store(&self) -> &TriggerStore {
        &self.store
    }

    pub fn file(&self) -> &TriggerFile {
        &self.file
    }

    pub fn state(&self) -> CaptureState {
        self.capture.lock().state()
    }

    /// Persist the current triggers
    pub fn save(&self) -> Result<()> {
        self.file.save(&self.store.to_map())
    }

    pub fn stop(&self) {
        self.capture.lock().stop();
    }

    /// Save, then stop capturing. The capture loop is stopped even when
    /// saving fails.
    pub fn shutdown(&self) -> Result<()> {
        let saved = self.save();
        self.stop();
        saved
    }
}
