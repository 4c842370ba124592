//! Time management utilities
//!
//! The simulation advances in fixed steps. Real frame time is accumulated and
//! drained one step at a time, up to a per-frame cap. When the cap is hit the
//! remaining accumulated time is dropped instead of carried over, so a slow
//! frame makes the simulation fall behind real time rather than spiral into
//! ever larger catch-up batches.

/// Outcome of feeding one frame's worth of time into a [`FixedTimestep`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlan {
    /// Number of fixed steps to simulate this frame
    pub steps: u32,
    /// Accumulated time discarded because the step cap was reached
    pub dropped: f32,
}

/// Fixed-step accumulator with a spiral-of-death guard
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
    total_steps: u64,
}

impl FixedTimestep {
    /// Create a new accumulator
    ///
    /// `step` is clamped to a small positive value and `max_steps` to at least one.
    pub fn new(step: f32, max_steps: u32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            max_steps: max_steps.max(1),
            accumulator: 0.0,
            total_steps: 0,
        }
    }

    /// Add a frame's elapsed time and work out how many steps to run
    pub fn advance(&mut self, frame_time: f32) -> StepPlan {
        if frame_time.is_finite() && frame_time > 0.0 {
            self.accumulator += frame_time;
        }

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        let dropped = if steps == self.max_steps && self.accumulator >= self.step {
            std::mem::take(&mut self.accumulator)
        } else {
            0.0
        };

        self.total_steps += u64::from(steps);
        StepPlan { steps, dropped }
    }

    /// Length of one fixed step in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Maximum steps simulated per frame
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Time carried over to the next frame
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Fraction of a step currently accumulated, useful for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Total fixed steps taken since creation
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Discard any accumulated time
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
