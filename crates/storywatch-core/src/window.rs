//! Active time-window gate.

use serde::{Deserialize, Serialize};

/// Daily hour window during which the loop is allowed to run.
///
/// Half-open `[start_hour, end_hour)`, wrapping across midnight when
/// `start_hour > end_hour`. `start == end` means always active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl ActiveWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    /// Returns true if `hour` (0-23) falls inside the window.
    #[must_use]
    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour == self.end_hour {
            return true;
        }
        if self.start_hour < self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            // Wrapping window, e.g. 22..6.
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    /// Seconds from `(hour, minute, second)` until the window next opens.
    ///
    /// Returns 0 when already inside. Used for the coarse pre-window sleep.
    #[must_use]
    pub fn seconds_until_open(&self, hour: u32, minute: u32, second: u32) -> u64 {
        if self.contains(hour) {
            return 0;
        }
        let now = u64::from(hour) * 3600 + u64::from(minute) * 60 + u64::from(second);
        let opens = u64::from(self.start_hour) * 3600;
        if opens > now {
            opens - now
        } else {
            24 * 3600 - now + opens
        }
    }
}

impl Default for ActiveWindow {
    fn default() -> Self {
        // Always active unless configured otherwise.
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_window() {
        let w = ActiveWindow::new(8, 22);
        assert!(!w.contains(7));
        assert!(w.contains(8));
        assert!(w.contains(21));
        assert!(!w.contains(22));
        assert!(!w.contains(23));
    }

    #[test]
    fn test_wrapping_window() {
        let w = ActiveWindow::new(22, 6);
        assert!(w.contains(23));
        assert!(w.contains(2));
        assert!(w.contains(22));
        assert!(!w.contains(6));
        assert!(!w.contains(10));
    }

    #[test]
    fn test_equal_bounds_always_active() {
        let w = ActiveWindow::new(0, 0);
        for hour in 0..24 {
            assert!(w.contains(hour));
        }
    }

    #[test]
    fn test_seconds_until_open_same_day() {
        let w = ActiveWindow::new(8, 22);
        // 07:30:00 -> opens in 30 minutes
        assert_eq!(w.seconds_until_open(7, 30, 0), 1800);
        // Already inside
        assert_eq!(w.seconds_until_open(12, 0, 0), 0);
    }

    #[test]
    fn test_seconds_until_open_next_day() {
        let w = ActiveWindow::new(8, 22);
        // 23:00:00 -> 9 hours until 08:00
        assert_eq!(w.seconds_until_open(23, 0, 0), 9 * 3600);
    }

    #[test]
    fn test_seconds_until_open_wrapping() {
        let w = ActiveWindow::new(22, 6);
        // 10:00 -> opens at 22:00, 12 hours away
        assert_eq!(w.seconds_until_open(10, 0, 0), 12 * 3600);
    }
}
