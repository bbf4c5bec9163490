use crate::error::{QuipError, Result};
use crate::event::{Key, KeyEvent};
use crate::pipeline::{Outcome, Pipeline};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A source of global key events.
///
/// `install` connects the hook to a sink; events reach the pipeline only
/// through [`EventSink::dispatch`].
pub trait KeyHook: Send {
    fn install(&mut self, sink: EventSink) -> Result<()>;

    /// Detach from the sink. Must be safe to call more than once.
    fn uninstall(&mut self);
}

/// Entry point for raw key events coming from a hook.
#[derive(Clone)]
pub struct EventSink {
    pipeline: Arc<Pipeline>,
    connected: Arc<AtomicBool>,
}

impl EventSink {
    pub(crate) fn new(pipeline: Arc<Pipeline>, connected: Arc<AtomicBool>) -> Self {
        Self {
            pipeline,
            connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn dispatch(&self, event: KeyEvent) -> Outcome {
        self.dispatch_at(event, Instant::now())
    }

    /// Dispatch with an explicit timestamp. Panics inside the pipeline are
    /// contained here so a single bad event cannot take down the hook.
    pub fn dispatch_at(&self, event: KeyEvent, now: Instant) -> Outcome {
        if !self.is_connected() {
            return Outcome::Ignored;
        }

        let event = self.pipeline.guard().classify(event, now);
        match panic::catch_unwind(AssertUnwindSafe(|| self.pipeline.handle(event, now))) {
            Ok(outcome) => outcome,
            Err(_) => {
                log::error!("Key event handler panicked; event dropped");
                self.pipeline.reset();
                Outcome::Failed
            }
        }
    }
}

/// Hook driven by hand instead of by the OS: events are pushed through
/// [`ManualHook::send`]. Used for dry runs and tests.
#[derive(Clone, Default)]
pub struct ManualHook {
    sink: Arc<Mutex<Option<EventSink>>>,
    failure: Option<String>,
}

impl ManualHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hook whose installation always fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sink: Arc::default(),
            failure: Some(message.into()),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.sink.lock().is_some()
    }

    /// Deliver one event; `None` when the hook is not installed
    pub fn send(&self, event: KeyEvent) -> Option<Outcome> {
        self.send_at(event, Instant::now())
    }

    pub fn send_at(&self, event: KeyEvent, now: Instant) -> Option<Outcome> {
        let sink = self.sink.lock().clone()?;
        Some(sink.dispatch_at(event, now))
    }

    /// Press every character of `text`; `\u{8}` is sent as backspace
    pub fn type_str(&self, text: &str) -> Vec<Outcome> {
        self.type_str_at(text, Instant::now())
    }

    pub fn type_str_at(&self, text: &str, now: Instant) -> Vec<Outcome> {
        text.chars()
            .filter_map(|c| {
                let key = if c == '\u{8}' { Key::Backspace } else { Key::Char(c) };
                self.send_at(KeyEvent::press(key), now)
            })
            .collect()
    }
}

impl KeyHook for ManualHook {
    fn install(&mut self, sink: EventSink) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(QuipError::Hook(message.clone()));
        }
        *self.sink.lock() = Some(sink);
        Ok(())
    }

    fn uninstall(&mut self) {
        self.sink.lock().take();
    }
}
