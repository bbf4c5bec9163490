use crate::error::Result;
use crate::event::KeyEvent;
use crate::matcher::Match;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sink for synthetic keyboard input.
pub trait InputEmitter: Send {
    /// Press and release backspace `count` times
    fn backspace(&mut self, count: usize) -> Result<()>;

    /// Type `text` as character input
    fn type_text(&mut self, text: &str) -> Result<()>;
}

/// The edit performed for one matched trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub trigger: String,
    pub delete: usize,
    pub insert: String,
}

impl From<Match<'_>> for Substitution {
    fn from(found: Match<'_>) -> Self {
        Self {
            trigger: found.trigger.to_string(),
            delete: found.delete_count(),
            insert: found.expansion.to_string(),
        }
    }
}

#[derive(Debug)]
struct GuardState {
    emitting: AtomicUsize,
    settle: Duration,
    quiet_until: Mutex<Option<Instant>>,
}

/// Tells the capture side which events quip produced itself.
///
/// Active while an emission is in progress and for a short settle window
/// after it, since the OS may deliver injected events a little late.
#[derive(Debug, Clone)]
pub struct SyntheticGuard {
    state: Arc<GuardState>,
}

impl SyntheticGuard {
    pub fn new(settle: Duration) -> Self {
        Self {
            state: Arc::new(GuardState {
                emitting: AtomicUsize::new(0),
                settle,
                quiet_until: Mutex::new(None),
            }),
        }
    }

    /// Mark an emission as in progress until the returned handle drops
    pub fn activate(&self) -> Emission<'_> {
        self.state.emitting.fetch_add(1, Ordering::SeqCst);
        Emission { guard: self }
    }

    pub fn is_active(&self, now: Instant) -> bool {
        if self.state.emitting.load(Ordering::SeqCst) > 0 {
            return true;
        }
        matches!(*self.state.quiet_until.lock(), Some(until) if now < until)
    }

    /// Flag `event` as synthetic if it arrived while the guard was active
    pub fn classify(&self, event: KeyEvent, now: Instant) -> KeyEvent {
        if !event.synthetic && self.is_active(now) {
            event.into_synthetic()
        } else {
            event
        }
    }

    fn release(&self) {
        let settle = self.state.settle;
        *self.state.quiet_until.lock() = (!settle.is_zero()).then(|| Instant::now() + settle);
        self.state.emitting.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for SyntheticGuard {
    fn default() -> Self {
        Self::new(Duration::from_millis(40))
    }
}

/// In-progress emission; releases the guard on drop.
#[must_use]
pub struct Emission<'a> {
    guard: &'a SyntheticGuard,
}

impl Drop for Emission<'_> {
    fn drop(&mut self) {
        self.guard.release();
    }
}

/// Delete the typed trigger, then type its expansion, with the guard held.
pub fn emit(
    emitter: &mut dyn InputEmitter,
    guard: &SyntheticGuard,
    substitution: &Substitution,
) -> Result<()> {
    let _emission = guard.activate();
    emitter.backspace(substitution.delete)?;
    emitter.type_text(&substitution.insert)?;
    Ok(())
}

/// One call made against a [`RecordingEmitter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    Backspace(usize),
    Text(String),
}

/// Emitter that records what it was asked to do instead of touching the OS.
///
/// Clones share the same log, so a test can keep one clone and hand the
/// other to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmitter {
    log: Arc<Mutex<Vec<Emitted>>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> Vec<Emitted> {
        self.log.lock().clone()
    }

    /// Concatenation of all typed text
    pub fn typed_text(&self) -> String {
        self.log
            .lock()
            .iter()
            .filter_map(|e| match e {
                Emitted::Text(text) => Some(text.as_str()),
                Emitted::Backspace(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

impl InputEmitter for RecordingEmitter {
    fn backspace(&mut self, count: usize) -> Result<()> {
        self.log.lock().push(Emitted::Backspace(count));
        Ok(())
    }

    fn type_text(&mut self, text: &str) -> Result<()> {
        self.log.lock().push(Emitted::Text(text.to_string()));
        Ok(())
    }
}
