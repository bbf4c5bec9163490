//! Key events as the capture pipeline sees them, independent of any OS hook.

/// The part of a key event the pipeline cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A key that produced a character.
    Char(char),
    Backspace,
    /// Arrows, modifiers, function keys and everything else.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub direction: KeyDirection,
    /// Produced by quip itself rather than the user.
    pub synthetic: bool,
}

impl KeyEvent {
    pub fn press(key: Key) -> Self {
        Self {
            key,
            direction: KeyDirection::Press,
            synthetic: false,
        }
    }

    pub fn release(key: Key) -> Self {
        Self {
            key,
            direction: KeyDirection::Release,
            synthetic: false,
        }
    }

    /// Key-down of a character key
    pub fn char(c: char) -> Self {
        Self::press(Key::Char(c))
    }

    /// Key-down of backspace
    pub fn backspace() -> Self {
        Self::press(Key::Backspace)
    }

    /// Mark the event as generated by quip
    pub fn into_synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    pub fn is_press(&self) -> bool {
        self.direction == KeyDirection::Press
    }
}
