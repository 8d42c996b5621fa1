use std::time::{Duration, Instant};

pub const DEFAULT_JUMP_TIMEOUT: Duration = Duration::from_millis(500);

/// Accumulates digit presses into a multi-digit jump code.
///
/// A digit extends the pending code when it arrives within `timeout` of the
/// previous digit, otherwise it starts a new code. There is no confirm key;
/// the caller jumps after every digit.
#[derive(Debug, Clone)]
pub struct JumpBuffer {
    digits: String,
    last_digit_at: Option<Instant>,
    timeout: Duration,
}

impl Default for JumpBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_JUMP_TIMEOUT)
    }
}

impl JumpBuffer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            digits: String::new(),
            last_digit_at: None,
            timeout,
        }
    }

    /// Feed one digit and return the jump code the buffer now spells.
    /// Non-digits are ignored.
    pub fn push(&mut self, digit: char, now: Instant) -> Option<usize> {
        if !digit.is_ascii_digit() {
            return None;
        }

        let continues = self
            .last_digit_at
            .is_some_and(|last| now.saturating_duration_since(last) < self.timeout);
        if !continues {
            self.digits.clear();
        }

        self.digits.push(digit);
        self.last_digit_at = Some(now);

        // saturate instead of overflowing on absurdly long buffers
        Some(self.digits.parse().unwrap_or(usize::MAX))
    }

    pub fn pending(&self) -> &str {
        &self.digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_within_timeout_accumulate() {
        let mut buffer = JumpBuffer::default();
        let start = Instant::now();
        assert_eq!(buffer.push('1', start), Some(1));
        assert_eq!(buffer.push('2', start + Duration::from_millis(200)), Some(12));
        assert_eq!(buffer.pending(), "12");
    }

    #[test]
    fn test_slow_digit_starts_new_code() {
        let mut buffer = JumpBuffer::default();
        let start = Instant::now();
        buffer.push('1', start);
        assert_eq!(buffer.push('2', start + Duration::from_millis(600)), Some(2));
    }

    #[test]
    fn test_timeout_measured_from_previous_digit() {
        let mut buffer = JumpBuffer::new(Duration::from_millis(500));
        let start = Instant::now();
        buffer.push('1', start);
        buffer.push('0', start + Duration::from_millis(400));
        assert_eq!(buffer.push('5', start + Duration::from_millis(800)), Some(105));
    }

    #[test]
    fn test_non_digit_ignored() {
        let mut buffer = JumpBuffer::default();
        assert_eq!(buffer.push('x', Instant::now()), None);
        assert_eq!(buffer.pending(), "");
    }
}
