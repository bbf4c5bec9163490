use crate::config::Settings;
use crate::error::{QuipError, Result};
use crate::hook::{EventSink, KeyHook};
use crate::pipeline::Pipeline;
use crate::sweeper::ExpirySweeper;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No hook installed yet.
    Idle,
    /// Hook installed, events flowing, sweeper running.
    Running,
    /// Torn down for good.
    Stopped,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "idle"),
            CaptureState::Running => write!(f, "running"),
            CaptureState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Owns a key hook, the pipeline it feeds and the expiry sweeper, and moves
/// them together through `Idle -> Running -> Stopped`.
pub struct CaptureLoop {
    pipeline: Arc<Pipeline>,
    hook: Box<dyn KeyHook>,
    connected: Arc<AtomicBool>,
    sweep_interval: Duration,
    sweeper: Option<ExpirySweeper>,
    state: CaptureState,
}

impl CaptureLoop {
    pub fn new(pipeline: Pipeline, hook: Box<dyn KeyHook>, settings: &Settings) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            hook,
            connected: Arc::new(AtomicBool::new(false)),
            sweep_interval: settings.sweep_interval(),
            sweeper: None,
            state: CaptureState::Idle,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Install the hook and start the sweeper.
    ///
    /// On failure nothing is left running and the loop stays `Idle`.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            CaptureState::Running => return Err(QuipError::CaptureAlreadyRunning),
            CaptureState::Stopped => return Err(QuipError::CaptureStopped),
            CaptureState::Idle => {}
        }

        self.connected.store(true, Ordering::SeqCst);
        let sink = EventSink::new(Arc::clone(&self.pipeline), Arc::clone(&self.connected));
        if let Err(e) = self.hook.install(sink) {
            self.connected.store(false, Ordering::SeqCst);
            log::error!("Failed to install keyboard hook: {}", e);
            return Err(e);
        }

        match ExpirySweeper::spawn(Arc::clone(&self.pipeline), self.sweep_interval) {
            Ok(sweeper) => self.sweeper = Some(sweeper),
            Err(e) => {
                self.connected.store(false, Ordering::SeqCst);
                self.hook.uninstall();
                return Err(e);
            }
        }

        self.state = CaptureState::Running;
        log::info!("Capture loop running");
        Ok(())
    }

    /// Tear down the hook and the sweeper. Calling it again is a no-op.
    pub fn stop(&mut self) {
        match self.state {
            CaptureState::Stopped => return,
            CaptureState::Idle => {}
            CaptureState::Running => {
                self.connected.store(false, Ordering::SeqCst);
                self.hook.uninstall();
                if let Some(sweeper) = self.sweeper.take() {
                    sweeper.stop();
                }
                self.pipeline.reset();
                log::info!("Capture loop stopped");
            }
        }
        self.state = CaptureState::Stopped;
    }
}

impl Drop for CaptureLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::RecordingEmitter;
    use crate::event::KeyEvent;
    use crate::hook::ManualHook;
    use crate::models::TriggerEntry;
    use crate::pipeline::Outcome;
    use crate::store::TriggerStore;

    fn capture(hook: ManualHook) -> (CaptureLoop, RecordingEmitter) {
        let store = TriggerStore::new();
        store.add(TriggerEntry::new("ok", "Alpha").unwrap());
        let recorder = RecordingEmitter::new();
        let settings = Settings::default();
        let pipeline = Pipeline::new(store, Box::new(recorder.clone()), &settings);
        (CaptureLoop::new(pipeline, Box::new(hook), &settings), recorder)
    }

    #[test]
    fn start_installs_hook_and_feeds_pipeline() {
        let hook = ManualHook::new();
        let (mut capture, recorder) = capture(hook.clone());
        assert_eq!(capture.state(), CaptureState::Idle);
        assert_eq!(hook.send(KeyEvent::char('o')), None);

        capture.start().unwrap();
        assert_eq!(capture.state(), CaptureState::Running);
        assert!(hook.is_installed());

        hook.type_str("ok");
        assert_eq!(recorder.typed_text(), "Alpha");
    }

    #[test]
    fn failed_install_stays_idle() {
        let (mut capture, _) = capture(ManualHook::failing("input access denied"));
        let err = capture.start().unwrap_err();

        assert!(matches!(err, QuipError::Hook(ref m) if m == "input access denied"));
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    #[test]
    fn stop_is_idempotent_and_terminal() {
        let hook = ManualHook::new();
        let (mut capture, _) = capture(hook.clone());
        capture.start().unwrap();
        assert!(matches!(
            capture.start(),
            Err(QuipError::CaptureAlreadyRunning)
        ));
        assert!(capture.sweeper.as_ref().map_or(false, |s| s.is_running()));

        capture.stop();
        assert_eq!(capture.state(), CaptureState::Stopped);
        assert!(!hook.is_installed());
        // stop() joins the sweeper thread before dropping it
        assert!(capture.sweeper.is_none());

        capture.stop();
        assert_eq!(capture.state(), CaptureState::Stopped);
        assert!(matches!(capture.start(), Err(QuipError::CaptureStopped)));
    }

    #[test]
    fn stale_sink_is_ignored_after_stop() {
        let hook = ManualHook::new();
        let (mut capture, recorder) = capture(hook.clone());
        capture.start().unwrap();

        let sink = EventSink::new(Arc::clone(capture.pipeline()), Arc::clone(&capture.connected));
        capture.stop();

        assert_eq!(sink.dispatch(KeyEvent::char('o')), Outcome::Ignored);
        assert_eq!(sink.dispatch(KeyEvent::char('k')), Outcome::Ignored);
        assert!(recorder.emitted().is_empty());
    }

    #[test]
    fn stopping_idle_loop_is_terminal() {
        let (mut capture, _) = capture(ManualHook::new());
        capture.stop();
        assert_eq!(capture.state(), CaptureState::Stopped);
    }
}
