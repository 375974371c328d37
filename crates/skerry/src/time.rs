//! Frame timing and delta time.
//!
//! The [`Time`] resource is advanced by the simulation at the start of each
//! tick with the Δt handed in by the platform's frame callback. Nothing here
//! reads a clock: the core never waits, it is only told how much time passed.

/// Frame timing, advanced once per [`Simulation::update`](crate::sim::Simulation::update).
#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    /// Duration of the current tick in seconds.
    delta: f32,
    /// Total simulated time.
    elapsed: f32,
    /// Tick counter.
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick of `delta` seconds. Negative deltas are clamped to zero.
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta.max(0.0);
        self.elapsed += self.delta;
        self.frame_count += 1;
    }

    /// Delta time in seconds.
    pub fn delta_secs(&self) -> f32 {
        self.delta
    }

    /// Total simulated time in seconds.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed
    }

    /// Number of ticks simulated so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
