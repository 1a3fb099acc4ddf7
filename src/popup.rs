//! Time-limited popup state.
//!
//! Only one popup is shown at a time; a new one replaces the old. Each
//! variant carries the `Instant` it was triggered, so expiry needs no extra
//! bookkeeping.

use std::time::{Duration, Instant};

use crate::config::POPUP_DURATION;

/// Active popup with its start time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Popup {
    /// "FPS ON/OFF" after the `F` key.
    Fps(Instant),
    /// Vehicle link dropped to `NO DATA` or `NO LINK`.
    LinkLost(Instant),
}

impl Popup {
    #[inline]
    pub const fn start_time(&self) -> Instant {
        match self {
            Self::Fps(t) | Self::LinkLost(t) => *t,
        }
    }

    /// Whether the popup has been visible for at least `duration` as of `now`.
    #[inline]
    pub fn is_expired_at(
        &self,
        now: Instant,
        duration: Duration,
    ) -> bool {
        now.saturating_duration_since(self.start_time()) >= duration
    }

    /// Check against the wall clock and [`POPUP_DURATION`].
    #[inline]
    pub fn is_expired(&self) -> bool { self.is_expired_at(Instant::now(), POPUP_DURATION) }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_popup_not_expired() {
        let popup = Popup::Fps(Instant::now());
        assert!(!popup.is_expired(), "Popup must stay visible right after triggering");
    }

    #[test]
    fn test_expires_after_duration() {
        let start = Instant::now();
        let popup = Popup::LinkLost(start);
        assert!(!popup.is_expired_at(start + POPUP_DURATION / 2, POPUP_DURATION));
        assert!(popup.is_expired_at(start + POPUP_DURATION, POPUP_DURATION), "Expires exactly at the duration");
    }

    #[test]
    fn test_clock_before_start_is_not_expired() {
        let start = Instant::now() + Duration::from_secs(1);
        let popup = Popup::Fps(start);
        assert!(!popup.is_expired_at(Instant::now(), POPUP_DURATION));
    }
}
