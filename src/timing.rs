//! Frame rate measurement.

use std::time::{Duration, Instant};

/// Interval between FPS recalculations.
const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Counts frames and recomputes FPS once per second.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self { Self::starting_at(Instant::now()) }

    pub const fn starting_at(start: Instant) -> Self {
        Self {
            window_start: start,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Record one frame finished at `now`.
    ///
    /// Returns `true` when the FPS value was recalculated.
    pub fn frame_at(
        &mut self,
        now: Instant,
    ) -> bool {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < FPS_WINDOW {
            return false;
        }
        self.fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        true
    }

    /// Record one frame finished now.
    pub fn frame(&mut self) -> bool { self.frame_at(Instant::now()) }

    /// Frames per second over the last completed window (0 before the first).
    #[inline]
    pub const fn fps(&self) -> f32 { self.fps }
}

impl Default for FpsCounter {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_before_first_window() {
        let start = Instant::now();
        let mut counter = FpsCounter::starting_at(start);
        for i in 1..30 {
            assert!(!counter.frame_at(start + Duration::from_millis(i * 10)));
        }
        assert_eq!(counter.fps(), 0.0, "No value until a full second has passed");
    }

    #[test]
    fn test_sixty_frames_per_second() {
        let start = Instant::now();
        let mut counter = FpsCounter::starting_at(start);
        let mut updated = false;
        for i in 1..=60u64 {
            updated = counter.frame_at(start + Duration::from_micros(i * 1_000_000 / 60));
        }
        assert!(updated, "Sixtieth frame closes the window");
        assert!((counter.fps() - 60.0).abs() < 0.01, "Expected 60 FPS, got {}", counter.fps());
    }

    #[test]
    fn test_window_restarts() {
        let start = Instant::now();
        let mut counter = FpsCounter::starting_at(start);
        counter.frame_at(start + Duration::from_secs(1));
        assert!((counter.fps() - 1.0).abs() < 1e-4);

        // 20 frames in the next second
        for i in 1..=20u64 {
            counter.frame_at(start + Duration::from_secs(1) + Duration::from_millis(i * 50));
        }
        assert!((counter.fps() - 20.0).abs() < 0.01, "Got {}", counter.fps());
    }
}
