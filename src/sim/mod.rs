//! Deterministic simulation module
//!
//! All ball physics lives here. This module must be pure and deterministic:
//! - Fixed per-tick constants only, never wall-clock deltas
//! - One snapshot read and one commit per tick
//! - No rendering, network or platform dependencies

pub mod clock;
pub mod input;
pub mod state;
pub mod tick;

pub use clock::{FixedClock, IntervalTimer};
pub use input::{HeldKeys, InputTracker, Key};
pub use state::SimState;
pub use tick::{step, tick};
