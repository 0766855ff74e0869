//! Simulation timing and delta time.
//!
//! The [`Time`] resource is advanced by the host once per tick with the Δt it
//! wants simulated. Nothing here reads the wall clock, so a replayed sequence
//! of deltas always produces the same simulation.

use std::time::Duration;

/// Tick timing resource. Inserted by the [`Runtime`](crate::runtime::Runtime)
/// and advanced each step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    /// Δt of the current tick.
    delta: Duration,
    /// Total simulated time.
    elapsed: Duration,
    /// Tick counter.
    tick_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds. Negative or non-finite values count as zero.
    pub fn advance_secs(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.advance(Duration::from_secs_f32(dt));
    }

    /// Advance by `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.tick_count += 1;
    }

    /// Duration of the current tick.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds (f32), the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total simulated time.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Total simulated time in seconds (f32).
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Number of ticks simulated so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let mut time = Time::new();
        time.advance_secs(0.25);
        time.advance_secs(0.5);
        assert_eq!(time.tick_count(), 2);
        assert!((time.delta_secs() - 0.5).abs() < 1e-6);
        assert!((time.elapsed_secs() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn negative_delta_is_clamped() {
        let mut time = Time::new();
        time.advance_secs(-1.0);
        time.advance_secs(f32::NAN);
        assert_eq!(time.delta_secs(), 0.0);
        assert_eq!(time.tick_count(), 2);
    }
}
