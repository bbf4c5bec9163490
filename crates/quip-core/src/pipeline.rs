use crate::buffer::InputBuffer;
use crate::config::Settings;
use crate::emitter::{emit, InputEmitter, SyntheticGuard, Substitution};
use crate::error::{QuipError, Result};
use crate::event::{Key, KeyEvent};
use crate::matcher::resolve;
use crate::store::TriggerStore;
use parking_lot::Mutex;
use std::time::Instant;

/// Characters kept for backspace recovery even when every trigger is shorter
const BUFFER_LIMIT: usize = 100;

/// What the pipeline did with one key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a key-down the buffer tracks, or the hook is detached.
    Ignored,
    /// Produced by quip itself.
    Synthetic,
    /// Character appended, nothing matched.
    Buffered,
    /// Backspace removed the last buffered character.
    Corrected,
    /// A trigger matched and was replaced.
    Expanded(Substitution),
    /// Processing failed; the buffer was reset.
    Failed,
}

/// Buffer, matching and emission for the key events of one capture loop.
///
/// The buffer and the emitter sit behind separate locks: a substitution is
/// decided and the buffer cleared before the emitter is touched, so events
/// arriving during an emission never wait on the buffer.
pub struct Pipeline {
    store: TriggerStore,
    buffer: Mutex<InputBuffer>,
    emitter: Mutex<Box<dyn InputEmitter>>,
    guard: SyntheticGuard,
}

impl Pipeline {
    pub fn new(store: TriggerStore, emitter: Box<dyn InputEmitter>, settings: &Settings) -> Self {
        Self {
            store,
            buffer: Mutex::new(InputBuffer::new(settings.buffer_timeout())),
            emitter: Mutex::new(emitter),
            guard: SyntheticGuard::new(settings.settle_window()),
        }
    }

    pub fn store(&self) -> &TriggerStore {
        &self.store
    }

    pub fn guard(&self) -> &SyntheticGuard {
        &self.guard
    }

    pub fn buffer_contents(&self) -> String {
        self.buffer.lock().contents()
    }

    /// Process one event, turning any failure into a logged, skipped event
    pub fn handle(&self, event: KeyEvent, now: Instant) -> Outcome {
        match self.ingest(event, now) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Skipping key event: {}", e);
                self.buffer.lock().clear();
                Outcome::Failed
            }
        }
    }

    /// Process one event
    pub fn ingest(&self, event: KeyEvent, now: Instant) -> Result<Outcome> {
        if event.synthetic {
            return Ok(Outcome::Synthetic);
        }
        if !event.is_press() {
            return Ok(Outcome::Ignored);
        }

        match event.key {
            Key::Char(c) if c.is_control() => Err(QuipError::UnexpectedEvent(format!(
                "control character U+{:04X} delivered as text",
                c as u32
            ))),
            Key::Char(c) => self.accept_char(c, now),
            Key::Backspace => {
                let mut buffer = self.buffer.lock();
                buffer.expire(now);
                buffer.remove_last();
                buffer.touch(now);
                Ok(Outcome::Corrected)
            }
            // Does not count as activity for expiry
            Key::Other => Ok(Outcome::Ignored),
        }
    }

    /// Clear the buffer if it has been idle too long
    pub fn sweep(&self, now: Instant) -> bool {
        self.buffer.lock().expire(now)
    }

    pub fn reset(&self) {
        self.buffer.lock().clear();
    }

    fn accept_char(&self, c: char, now: Instant) -> Result<Outcome> {
        let triggers = self.store.snapshot();

        let substitution = {
            let mut buffer = self.buffer.lock();
            buffer.set_capacity(triggers.longest().max(BUFFER_LIMIT));
            buffer.append(c, now);

            let contents = buffer.contents();
            match resolve(&contents, &triggers) {
                Some(found) => {
                    buffer.clear();
                    Substitution::from(found)
                }
                None => return Ok(Outcome::Buffered),
            }
        };

        log::debug!(
            "Expanding trigger '{}' ({} chars)",
            substitution.trigger,
            substitution.delete
        );

        let mut emitter = self.emitter.lock();
        emit(emitter.as_mut(), &self.guard, &substitution)?;
        Ok(Outcome::Expanded(substitution))
    }
}
