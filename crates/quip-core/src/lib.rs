//! quip - keystroke capture and trigger matching for a global text expander.
//!
//! Typed characters are collected in a short-lived rolling buffer. Whenever
//! the buffer ends with a registered trigger, the trigger is erased with
//! synthetic backspaces and its expansion is typed in its place.

pub mod buffer;
pub mod capture;
pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod hook;
pub mod keyboard;
pub mod matcher;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod storage;
pub mod store;
pub mod sweeper;

// Re-export common items for convenience
pub use capture::{CaptureLoop, CaptureState};
pub use config::{get_config_dir, Settings};
pub use emitter::{InputEmitter, RecordingEmitter, Substitution, SyntheticGuard};
pub use error::{QuipError, Result};
pub use event::{Key, KeyDirection, KeyEvent};
pub use hook::{EventSink, KeyHook, ManualHook};
pub use keyboard::{translate_event, EnigoEmitter};
pub use models::{TriggerEntry, TriggerMap};
pub use pipeline::{Outcome, Pipeline};
pub use session::Session;
pub use storage::TriggerFile;
pub use store::{TriggerSet, TriggerStore};
