//! Simulation state
//!
//! Everything the stepper reads and writes lives in one `Copy` value, so a
//! tick can build the next state from locals and commit it in one assignment.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Complete simulation state for one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    /// Ball top-left corner in field pixels
    pub pos: Vec2,
    /// Velocity in px/tick. `x` is the horizontal impulse applied last tick
    /// and is never integrated; `y` accumulates gravity.
    pub vel: Vec2,
    /// Set by a jump, cleared only by landing on the floor
    pub jumping: bool,
    /// Ticks with rightward displacement
    pub score: u64,
    /// Committed tick counter
    pub time_ticks: u64,
}

impl SimState {
    /// Fresh state resting on the floor at the spawn point
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: tuning.spawn_position(),
            vel: Vec2::ZERO,
            jumping: false,
            score: 0,
            time_ticks: 0,
        }
    }
}
