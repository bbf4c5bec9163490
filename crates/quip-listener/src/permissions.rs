use quip_core::Result;

#[cfg(any(target_os = "linux", target_os = "macos"))]
use quip_core::QuipError;

/// Check that the OS will let us observe global keyboard input.
///
/// Returns `PermissionDenied` with instructions for the operator when a
/// prerequisite is missing.
pub fn check_input_permissions() -> Result<()> {
    #[cfg(target_os = "linux")]
    {
        // rdev hooks X11 on Linux; without a display there is nothing to attach to
        if std::env::var_os("DISPLAY").map_or(true, |d| d.is_empty()) {
            return Err(QuipError::PermissionDenied(
                "no X11 display found (DISPLAY is unset). Run quip inside a graphical session; \
                 under Wayland it needs XWayland"
                    .to_string(),
            ));
        }
    }

    #[cfg(target_os = "macos")]
    {
        if !has_accessibility_permission() {
            return Err(QuipError::PermissionDenied(format!(
                "Accessibility permission not granted for {}. Enable it under System Settings > \
                 Privacy & Security > Accessibility (and Input Monitoring on macOS 14+), then restart quip",
                detect_terminal_app()
            )));
        }
    }

    Ok(())
}

#[cfg(target_os = "macos")]
fn has_accessibility_permission() -> bool {
    use std::process::Command;

    // System Events refuses scripting without accessibility permission
    Command::new("osascript")
        .arg("-e")
        .arg("tell application \"System Events\" to return name of first process")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(target_os = "macos")]
fn detect_terminal_app() -> String {
    match std::env::var("TERM_PROGRAM").as_deref() {
        Ok("Apple_Terminal") => "Terminal".to_string(),
        Ok("iTerm.app") => "iTerm2".to_string(),
        Ok("vscode") => "Visual Studio Code".to_string(),
        Ok(other) if !other.is_empty() => other.to_string(),
        _ => "your terminal application".to_string(),
    }
}
