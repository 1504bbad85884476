//! Frame timing with a capped delta.

use std::time::Instant;

/// Upper bound on the per-frame time step, in seconds.
/// A frame hitch must not translate into one huge, destabilizing
/// integration step.
pub const MAX_FRAME_DELTA: f32 = 0.016;

/// A clock for per-frame simulation timing.
///
/// `delta()` returns the wall-clock time since the previous call, capped at
/// [`MAX_FRAME_DELTA`]; `elapsed()` reports uncapped total running time.
pub struct FrameClock {
    /// Whether the clock is running.
    running: bool,
    /// Time of the last delta query in seconds.
    old_time: f64,
    /// Total elapsed time while running.
    elapsed_time: f64,
    instant: Option<Instant>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock (not started).
    pub fn new() -> Self {
        Self {
            running: false,
            old_time: 0.0,
            elapsed_time: 0.0,
            instant: None,
        }
    }

    /// Create and start a new clock.
    pub fn start_new() -> Self {
        let mut clock = Self::new();
        clock.start();
        clock
    }

    fn now(&self) -> f64 {
        self.instant
            .map(|i| i.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Start the clock.
    pub fn start(&mut self) {
        self.instant = Some(Instant::now());
        self.old_time = self.now();
        self.elapsed_time = 0.0;
        self.running = true;
    }

    /// Time step for the current frame in seconds, capped at
    /// [`MAX_FRAME_DELTA`].
    pub fn delta(&mut self) -> f32 {
        (self.raw_delta() as f32).min(MAX_FRAME_DELTA)
    }

    /// Uncapped time since the last delta query, in seconds.
    pub fn raw_delta(&mut self) -> f64 {
        if !self.running {
            self.start();
            return 0.0;
        }

        let new_time = self.now();
        let diff = new_time - self.old_time;
        self.old_time = new_time;
        self.elapsed_time += diff;

        diff
    }

    /// Total elapsed time since the clock started (in seconds).
    pub fn elapsed(&mut self) -> f64 {
        self.raw_delta();
        self.elapsed_time
    }

    /// Check if the clock is running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_stopped() {
        let clock = FrameClock::new();
        assert!(!clock.is_running());
    }

    #[test]
    fn test_first_delta_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.raw_delta(), 0.0);
        assert!(clock.is_running());
    }

    #[test]
    fn test_delta_is_capped() {
        let mut clock = FrameClock::start_new();
        // Simulate a long stall by rewinding the reference point.
        clock.old_time -= 10.0;
        assert_eq!(clock.delta(), MAX_FRAME_DELTA);
    }
}
