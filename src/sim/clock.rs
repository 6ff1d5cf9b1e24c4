//! Scheduling clocks
//!
//! The display refresh drives `advance` with wall-clock frame deltas; the
//! clocks turn those into whole ticks or timer firings. Tests skip the
//! clocks and drive ticks directly.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Fixed-tick accumulator for the physics stepper
#[derive(Debug, Clone)]
pub struct FixedClock {
    step: f64,
    max_substeps: u32,
    accumulator: f64,
    cancelled: bool,
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS)
    }
}

impl FixedClock {
    pub fn new(step: f64, max_substeps: u32) -> Self {
        Self {
            step,
            max_substeps,
            accumulator: 0.0,
            cancelled: false,
        }
    }

    /// Feed a frame delta (seconds), returning how many ticks are due
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        if self.cancelled || !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.min(MAX_FRAME_DT);

        let mut due = 0;
        while self.accumulator >= self.step && due < self.max_substeps {
            self.accumulator -= self.step;
            due += 1;
        }
        // Drop backlog the substep cap could not absorb
        if due == self.max_substeps {
            self.accumulator = self.accumulator.min(self.step);
        }
        due
    }

    /// Stop producing ticks for good
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.accumulator = 0.0;
    }
}

/// Repeating wall-clock timer
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: f64,
    elapsed: f64,
    cancelled: bool,
}

impl IntervalTimer {
    pub fn new(period: f64) -> Self {
        Self {
            period,
            elapsed: 0.0,
            cancelled: false,
        }
    }

    /// Feed elapsed seconds, returning how many periods completed
    pub fn advance(&mut self, dt: f64) -> u32 {
        if self.cancelled || self.period <= 0.0 || !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.elapsed += dt;
        let mut fired = 0;
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            fired += 1;
        }
        fired
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}
