use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Whether a buffer last fed at `last_accepted` is stale at `now`.
pub fn is_expired(now: Instant, last_accepted: Instant, timeout: Duration) -> bool {
    now.saturating_duration_since(last_accepted) > timeout
}

/// Rolling window of the characters the user typed most recently.
///
/// Characters are stored lowercased. The window is cleared once more than
/// `timeout` passes between accepted keystrokes and never grows past
/// `capacity` characters.
#[derive(Debug)]
pub struct InputBuffer {
    chars: VecDeque<char>,
    last_accepted: Option<Instant>,
    timeout: Duration,
    capacity: usize,
}

impl InputBuffer {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new(timeout: Duration) -> Self {
        Self {
            chars: VecDeque::new(),
            last_accepted: None,
            timeout,
            capacity: usize::MAX,
        }
    }

    /// Cap the window, discarding the oldest characters beyond it
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    pub fn append(&mut self, ch: char, now: Instant) {
        self.expire(now);
        self.chars.extend(ch.to_lowercase());
        self.trim();
        self.last_accepted = Some(now);
    }

    pub fn remove_last(&mut self) -> Option<char> {
        self.chars.pop_back()
    }

    /// Record activity without adding a character
    pub fn touch(&mut self, now: Instant) {
        self.last_accepted = Some(now);
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    /// Clear the buffer if it went stale. Returns true when contents were dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(last) if is_expired(now, last, self.timeout) && !self.chars.is_empty() => {
                self.chars.clear();
                true
            }
            _ => false,
        }
    }

    pub fn contents(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn trim(&mut self) {
        while self.chars.len() > self.capacity {
            self.chars.pop_front();
        }
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(buffer: &mut InputBuffer, text: &str, now: Instant) {
        for c in text.chars() {
            buffer.append(c, now);
        }
    }

    #[test]
    fn expiry_is_strictly_greater_than_timeout() {
        let t0 = Instant::now();
        let timeout = Duration::from_secs(2);
        assert!(!is_expired(t0 + timeout, t0, timeout));
        assert!(is_expired(t0 + timeout + Duration::from_millis(1), t0, timeout));
        // A clock that appears to run backwards is never stale
        assert!(!is_expired(t0, t0 + timeout * 2, timeout));
    }

    #[test]
    fn append_lowercases() {
        let mut buffer = InputBuffer::default();
        typed(&mut buffer, "HeLLo", Instant::now());
        assert_eq!(buffer.contents(), "hello");
    }

    #[test]
    fn append_after_gap_starts_fresh() {
        let t0 = Instant::now();
        let mut buffer = InputBuffer::default();
        typed(&mut buffer, "ab", t0);
        buffer.append('c', t0 + Duration::from_millis(2500));
        assert_eq!(buffer.contents(), "c");
    }

    #[test]
    fn append_within_timeout_keeps_history() {
        let t0 = Instant::now();
        let mut buffer = InputBuffer::default();
        buffer.append('a', t0);
        buffer.append('b', t0 + Duration::from_millis(1900));
        buffer.append('c', t0 + Duration::from_millis(3800));
        assert_eq!(buffer.contents(), "abc");
    }

    #[test]
    fn remove_last_on_empty_is_noop() {
        let mut buffer = InputBuffer::default();
        assert_eq!(buffer.remove_last(), None);
        buffer.append('x', Instant::now());
        assert_eq!(buffer.remove_last(), Some('x'));
        assert!(buffer.is_empty());
    }

    #[test]
    fn capacity_discards_oldest() {
        let mut buffer = InputBuffer::default();
        buffer.set_capacity(3);
        typed(&mut buffer, "abcdef", Instant::now());
        assert_eq!(buffer.contents(), "def");

        buffer.set_capacity(1);
        assert_eq!(buffer.contents(), "f");
    }

    #[test]
    fn expire_reports_only_real_clears() {
        let t0 = Instant::now();
        let mut buffer = InputBuffer::default();
        assert!(!buffer.expire(t0 + Duration::from_secs(10)));

        buffer.append('a', t0);
        assert!(!buffer.expire(t0 + Duration::from_secs(1)));
        assert!(buffer.expire(t0 + Duration::from_secs(3)));
        assert!(buffer.is_empty());
        assert!(!buffer.expire(t0 + Duration::from_secs(4)));
    }
}
