mod keyboard_listener;
mod permissions;

pub use keyboard_listener::RdevHook;
pub use permissions::check_input_permissions;

use quip_core::{EnigoEmitter, Result, Session, Settings};

/// Start a session hooked into the real keyboard.
///
/// Fails before anything is installed when the OS does not grant access to
/// keyboard input.
pub fn start_session(settings: &Settings) -> Result<Session> {
    check_input_permissions()?;

    Session::open(
        settings,
        Box::new(RdevHook::new()),
        Box::new(EnigoEmitter::new(settings)),
    )
}
