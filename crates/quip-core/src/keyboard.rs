use crate::config::Settings;
use crate::emitter::InputEmitter;
use crate::error::{QuipError, Result};
use crate::event::{Key, KeyDirection, KeyEvent};
use enigo::{Direction, Enigo, Key as EnigoKey, Keyboard, Settings as EnigoSettings};
use rdev::{self, EventType, Key as RdevKey};
use std::thread;
use std::time::Duration;

/// Longest run of characters handed to the OS in one call
const CHUNK_SIZE: usize = 512;

/// Convert an rdev event into a pipeline event. Mouse and wheel events map
/// to `None`.
pub fn translate_event(event: &rdev::Event) -> Option<KeyEvent> {
    let (key, direction) = match event.event_type {
        EventType::KeyPress(key) => (key, KeyDirection::Press),
        EventType::KeyRelease(key) => (key, KeyDirection::Release),
        _ => return None,
    };

    let key = match key {
        RdevKey::Backspace => Key::Backspace,
        _ => match event_char(event) {
            Some(c) => Key::Char(c),
            None => Key::Other,
        },
    };

    Some(KeyEvent {
        key,
        direction,
        synthetic: false,
    })
}

/// The printable character an event produced, if exactly one
fn event_char(event: &rdev::Event) -> Option<char> {
    let name = event.name.as_deref()?;
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(c),
        _ => None,
    }
}

/// Create a keyboard controller
pub fn create_keyboard_controller() -> Result<Enigo> {
    Enigo::new(&EnigoSettings::default()).map_err(|err| {
        QuipError::Enigo(format!("Failed to create keyboard controller: {}", err))
    })
}

/// Send backspace key presses
pub fn send_backspace(keyboard: &mut impl Keyboard, count: usize, delay: Duration) -> Result<()> {
    for _ in 0..count {
        keyboard
            .key(EnigoKey::Backspace, Direction::Click)
            .map_err(|err| QuipError::Enigo(format!("Failed to send backspace: {}", err)))?;

        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    Ok(())
}

/// Type `text`, sending each newline as a Return key click
pub fn type_text_with_formatting(keyboard: &mut impl Keyboard, text: &str) -> Result<()> {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            // Type a newline between lines (not before the first line)
            keyboard
                .key(EnigoKey::Return, Direction::Click)
                .map_err(|err| QuipError::Enigo(format!("Failed to type newline: {}", err)))?;

            thread::sleep(Duration::from_millis(5));
        }

        if line.chars().count() > CHUNK_SIZE {
            for chunk in line.chars().collect::<Vec<_>>().chunks(CHUNK_SIZE) {
                let chunk_str: String = chunk.iter().collect();
                keyboard
                    .text(&chunk_str)
                    .map_err(|err| QuipError::Enigo(format!("Failed to type text: {}", err)))?;

                // Small delay between chunks
                thread::sleep(Duration::from_millis(10));
            }
        } else if !line.is_empty() {
            keyboard
                .text(line)
                .map_err(|err| QuipError::Enigo(format!("Failed to type text: {}", err)))?;
        }
    }

    Ok(())
}

/// Emitter that injects real keyboard input through enigo.
///
/// A controller is created per call so the emitter stays `Send` on every
/// platform.
#[derive(Debug, Clone)]
pub struct EnigoEmitter {
    keystroke_delay: Duration,
}

impl EnigoEmitter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            keystroke_delay: settings.keystroke_delay(),
        }
    }
}

impl InputEmitter for EnigoEmitter {
    fn backspace(&mut self, count: usize) -> Result<()> {
        let mut keyboard = create_keyboard_controller()?;
        send_backspace(&mut keyboard, count, self.keystroke_delay)
    }

    fn type_text(&mut self, text: &str) -> Result<()> {
        let mut keyboard = create_keyboard_controller()?;
        type_text_with_formatting(&mut keyboard, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn event(event_type: EventType, name: Option<&str>) -> rdev::Event {
        rdev::Event {
            time: SystemTime::now(),
            name: name.map(str::to_string),
            event_type,
        }
    }

    #[test]
    fn printable_press_becomes_char() {
        let translated = translate_event(&event(EventType::KeyPress(RdevKey::KeyA), Some("A")));
        assert_eq!(translated, Some(KeyEvent::char('A')));
    }

    #[test]
    fn non_ascii_names_are_kept() {
        let translated = translate_event(&event(EventType::KeyPress(RdevKey::Unknown(0)), Some("é")));
        assert_eq!(translated, Some(KeyEvent::char('é')));
    }

    #[test]
    fn backspace_wins_over_its_name() {
        let translated =
            translate_event(&event(EventType::KeyPress(RdevKey::Backspace), Some("\u{8}")));
        assert_eq!(translated, Some(KeyEvent::backspace()));
    }

    #[test]
    fn control_and_unnamed_keys_are_other() {
        let ret = translate_event(&event(EventType::KeyPress(RdevKey::Return), Some("\r")));
        assert_eq!(ret, Some(KeyEvent::press(Key::Other)));

        let shift = translate_event(&event(EventType::KeyPress(RdevKey::ShiftLeft), None));
        assert_eq!(shift, Some(KeyEvent::press(Key::Other)));
    }

    #[test]
    fn release_keeps_direction() {
        let translated = translate_event(&event(EventType::KeyRelease(RdevKey::KeyA), None));
        assert_eq!(translated, Some(KeyEvent::release(Key::Other)));
    }

    #[test]
    fn mouse_events_are_dropped() {
        let moved = event(EventType::MouseMove { x: 1.0, y: 2.0 }, None);
        assert_eq!(translate_event(&moved), None);
    }
}
