//! Moving-average smoothing for raw sensor readings.
//!
//! OBD-II answers arrive at an irregular cadence and RPM in particular is
//! jittery at idle. Each gauge owns one [`MovingAverage`] and draws the mean
//! of the last N accepted samples instead of the latest raw value.
//!
//! # Window Semantics
//!
//! The window is a FIFO of at most `capacity` samples. Adding to a full
//! window evicts the oldest sample first, so the mean always covers exactly
//! the most recent `min(added, capacity)` values.
//!
//! # Empty Window
//!
//! [`MovingAverage::mean`] returns `None` until the first sample arrives.
//! Callers decide what an empty gauge shows; the filter never divides by zero.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Fixed-capacity sliding window producing the arithmetic mean.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    /// Accepted samples, oldest at the front.
    window: VecDeque<f32>,

    /// Maximum number of samples kept.
    capacity: NonZeroUsize,
}

impl MovingAverage {
    /// Create an empty filter holding up to `capacity` samples.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when the window is full.
    ///
    /// Non-finite values (NaN, infinities) are ignored: one corrupt reading
    /// would otherwise poison the mean for the whole window.
    pub fn add_value(
        &mut self,
        value: f32,
    ) {
        if !value.is_finite() {
            return;
        }
        // Maintain fixed-size window (FIFO)
        if self.window.len() >= self.capacity.get() {
            self.window.pop_front();
        }
        self.window.push_back(value);
    }

    /// Arithmetic mean of the current window, or `None` when empty.
    ///
    /// The sum is recomputed from the window rather than kept as a running
    /// total, so long sessions do not accumulate float drift.
    pub fn mean(&self) -> Option<f32> {
        if self.window.is_empty() {
            None
        } else {
            Some(self.window.iter().sum::<f32>() / self.window.len() as f32)
        }
    }

    /// Number of samples currently in the window.
    #[inline]
    pub fn len(&self) -> usize { self.window.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.window.is_empty() }

    #[inline]
    pub const fn capacity(&self) -> NonZeroUsize { self.capacity }

    /// Drop all samples.
    pub fn clear(&mut self) { self.window.clear(); }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(capacity: usize) -> MovingAverage {
        MovingAverage::new(NonZeroUsize::new(capacity).expect("test capacity is non-zero"))
    }

    // -------------------------------------------------------------------------
    // Empty Window Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_is_empty() {
        let avg = filter(5);
        assert!(avg.is_empty(), "New filter should be empty");
        assert_eq!(avg.len(), 0);
        assert_eq!(avg.capacity().get(), 5);
    }

    #[test]
    fn test_mean_empty_is_none() {
        let avg = filter(5);
        assert!(avg.mean().is_none(), "Mean of empty window should be None");
    }

    // -------------------------------------------------------------------------
    // Mean Tests (N <= capacity)
    // -------------------------------------------------------------------------

    #[test]
    fn test_mean_single_value() {
        let mut avg = filter(5);
        avg.add_value(800.0);
        assert_eq!(avg.mean(), Some(800.0), "Mean of one value is that value");
    }

    #[test]
    fn test_mean_partial_window() {
        let mut avg = filter(5);
        avg.add_value(10.0);
        avg.add_value(20.0);
        avg.add_value(30.0);
        assert_eq!(avg.len(), 3);
        assert_eq!(avg.mean(), Some(20.0), "Mean of 10,20,30 should be 20");
    }

    #[test]
    fn test_mean_every_prefix_up_to_capacity() {
        let values = [3.0, 9.0, 1.5, 12.25, 7.0, 4.0];
        let mut avg = filter(values.len());
        for n in 1..=values.len() {
            avg.add_value(values[n - 1]);
            let expected = values[..n].iter().sum::<f32>() / n as f32;
            let actual = avg.mean().expect("non-empty window has a mean");
            assert!(
                (actual - expected).abs() < 1e-5,
                "After {n} values mean should be {expected}, got {actual}"
            );
        }
    }

    // -------------------------------------------------------------------------
    // Eviction Tests (N > capacity)
    // -------------------------------------------------------------------------

    #[test]
    fn test_eviction_excludes_oldest() {
        let mut avg = filter(4);
        for value in [1000.0, 10.0, 20.0, 30.0] {
            avg.add_value(value);
        }
        assert_eq!(avg.mean(), Some(265.0));

        // capacity + 1: the 1000 must fall out
        avg.add_value(40.0);
        assert_eq!(avg.len(), 4, "Window length should stay at capacity");
        assert_eq!(avg.mean(), Some(25.0), "Mean should cover 10,20,30,40 only");
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut avg = filter(3);
        for i in 0..100 {
            avg.add_value(i as f32);
            assert!(avg.len() <= 3, "Window exceeded capacity after {i} inserts");
        }
        assert_eq!(avg.mean(), Some(98.0), "Mean should cover 97,98,99");
    }

    #[test]
    fn test_capacity_one_tracks_latest() {
        let mut avg = filter(1);
        avg.add_value(5.0);
        avg.add_value(7.0);
        assert_eq!(avg.mean(), Some(7.0));
    }

    // -------------------------------------------------------------------------
    // Input Hygiene Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_non_finite_values_ignored() {
        let mut avg = filter(4);
        avg.add_value(10.0);
        avg.add_value(f32::NAN);
        avg.add_value(f32::INFINITY);
        avg.add_value(f32::NEG_INFINITY);
        assert_eq!(avg.len(), 1, "Only the finite value should be stored");
        assert_eq!(avg.mean(), Some(10.0));
    }

    #[test]
    fn test_clear() {
        let mut avg = filter(4);
        avg.add_value(10.0);
        avg.add_value(20.0);
        avg.clear();
        assert!(avg.is_empty());
        assert!(avg.mean().is_none(), "Mean should be None after clear");
    }
}
