use parking_lot::Mutex;
use quip_core::hook::{EventSink, KeyHook};
use quip_core::keyboard::translate_event;
use quip_core::{QuipError, Result};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const MAX_RETRIES: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const STARTUP_PROBE: Duration = Duration::from_millis(300);

type SharedSink = Arc<Mutex<Option<EventSink>>>;

/// Global key hook backed by `rdev::listen`.
///
/// `rdev` offers no way to unregister a listener, so uninstalling detaches
/// the sink and leaves the listener thread parked in the OS hook, dropping
/// every event until the process exits.
pub struct RdevHook {
    sink: SharedSink,
    thread: Option<JoinHandle<()>>,
    probe: Duration,
}

impl RdevHook {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(Mutex::new(None)),
            thread: None,
            probe: STARTUP_PROBE,
        }
    }
}

impl Default for RdevHook {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyHook for RdevHook {
    fn install(&mut self, sink: EventSink) -> Result<()> {
        *self.sink.lock() = Some(sink);

        // The listener thread survives uninstall; reattaching is enough
        if self.thread.as_ref().map_or(false, |h| !h.is_finished()) {
            return Ok(());
        }

        let (startup_tx, startup_rx) = mpsc::channel::<String>();
        let shared = Arc::clone(&self.sink);
        let probe = self.probe;
        let handle = thread::Builder::new()
            .name("quip-listener".to_string())
            .spawn(move || listen_with_retries(shared, startup_tx, probe))?;

        // listen() blocks for as long as it works, so an early return means
        // the hook could not be installed
        match startup_rx.recv_timeout(self.probe) {
            Ok(message) => {
                self.sink.lock().take();
                reap_listener(handle);
                Err(QuipError::Hook(message))
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                log::debug!("Keyboard listener installed");
                self.thread = Some(handle);
                Ok(())
            }
        }
    }

    fn uninstall(&mut self) {
        if self.sink.lock().take().is_some() {
            log::debug!("Keyboard listener detached");
        }
    }
}

/// Join a listener thread that already gave up
fn reap_listener(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        log::debug!("Keyboard listener thread panicked during startup");
    }
}

fn listen_with_retries(sink: SharedSink, startup: Sender<String>, probe: Duration) {
    let mut retry_count = 0;

    loop {
        let callback_sink = Arc::clone(&sink);
        let started = Instant::now();

        let result = rdev::listen(move |event| {
            // Clone out of the lock so a slow substitution never blocks uninstall
            let Some(sink) = callback_sink.lock().clone() else {
                return;
            };
            if let Some(key_event) = translate_event(&event) {
                sink.dispatch(key_event);
            }
        });

        match result {
            Ok(()) => break,
            Err(e) if retry_count == 0 && started.elapsed() < probe => {
                let _ = startup.send(format!("{:?}", e));
                break;
            }
            Err(e) => {
                log::error!("Error in keyboard listener: {:?}", e);
                retry_count += 1;
                if retry_count >= MAX_RETRIES {
                    log::error!(
                        "Failed to restart keyboard listener after {} attempts",
                        MAX_RETRIES
                    );
                    break;
                }
                log::warn!(
                    "Retrying keyboard listener ({}/{})...",
                    retry_count,
                    MAX_RETRIES
                );
                thread::sleep(RETRY_DELAY);
            }
        }
    }
}
