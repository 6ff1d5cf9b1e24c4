//! One player's run, from mount to teardown
//!
//! The session owns the simulation state and both timers. Input handlers and
//! frame callbacks all take `&mut Session`, so on a single-threaded event
//! loop a key event can only land between ticks, never inside one.

use glam::Vec2;

use crate::gateway::{Gateway, TopScore};
use crate::leaderboard::potential_rank;
use crate::player::PlayerId;
use crate::settings::Settings;
use crate::sim::{FixedClock, InputTracker, IntervalTimer, Key, SimState, tick};
use crate::tuning::Tuning;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Ticking and accepting input
    Running,
    /// Timers cancelled, final score flushed
    TornDown,
}

/// A running game bound to one player and one leaderboard gateway
pub struct Session<G: Gateway> {
    player: PlayerId,
    tuning: Tuning,
    state: SimState,
    input: InputTracker,
    clock: FixedClock,
    /// None when position reporting is disabled
    report_timer: Option<IntervalTimer>,
    gateway: G,
    phase: SessionPhase,
}

impl<G: Gateway> Session<G> {
    /// Mount a session and ask the gateway for the current top scores
    pub fn start(player: PlayerId, tuning: Tuning, report_interval_secs: f64, gateway: G) -> Self {
        let report_timer =
            (report_interval_secs > 0.0).then(|| IntervalTimer::new(report_interval_secs));
        let state = SimState::new(&tuning);
        log::info!(
            "Session started for {} at ({}, {})",
            player,
            state.pos.x,
            state.pos.y
        );
        gateway.refresh_top_scores();
        Self {
            player,
            tuning,
            state,
            input: InputTracker::new(),
            clock: FixedClock::default(),
            report_timer,
            gateway,
            phase: SessionPhase::Running,
        }
    }

    pub fn from_settings(player: PlayerId, settings: &Settings, gateway: G) -> Self {
        Self::start(player, settings.tuning, settings.report_interval_secs, gateway)
    }

    /// Key-down edge. Returns true if it triggered a jump.
    pub fn key_down(&mut self, key: Key) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.input.key_down(key, &mut self.state, &self.tuning)
    }

    pub fn key_up(&mut self, key: Key) {
        if self.phase != SessionPhase::Running {
            return;
        }
        self.input.key_up(key);
    }

    /// Window lost focus: key-up events will not arrive
    pub fn release_keys(&mut self) {
        self.input.release_all();
    }

    /// Feed a frame delta (seconds). Runs the ticks that became due and
    /// reports the position if the report interval elapsed.
    ///
    /// Returns the number of ticks run.
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        if self.phase != SessionPhase::Running {
            return 0;
        }
        let due = self.clock.advance(frame_dt);
        self.run_ticks(due);

        let fired = self
            .report_timer
            .as_mut()
            .map(|t| t.advance(frame_dt))
            .unwrap_or(0);
        if fired > 0 {
            self.gateway.report_position(self.state.pos);
        }
        due
    }

    /// Run `n` ticks back to back, bypassing the clock
    pub fn run_ticks(&mut self, n: u32) -> u32 {
        if self.phase != SessionPhase::Running {
            return 0;
        }
        for _ in 0..n {
            tick(&mut self.state, self.input.held(), &self.tuning);
        }
        n
    }

    /// Stop timers, drop input and flush the final score once.
    ///
    /// Returns the submitted score, or None if nothing was submitted (zero
    /// score, or already torn down).
    pub fn teardown(&mut self) -> Option<u64> {
        if self.phase == SessionPhase::TornDown {
            return None;
        }
        self.clock.cancel();
        if let Some(timer) = self.report_timer.as_mut() {
            timer.cancel();
        }
        self.input.release_all();
        self.phase = SessionPhase::TornDown;

        let score = self.state.score;
        log::info!(
            "Session for {} ended after {} ticks with score {}",
            self.player,
            self.state.time_ticks,
            score
        );
        if score == 0 {
            return None;
        }
        self.gateway.submit_score(&self.player, score);
        Some(score)
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn position(&self) -> Vec2 {
        self.state.pos
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn top_scores(&self) -> Vec<TopScore> {
        self.gateway.top_scores()
    }

    /// Rank the current score would take on the cached leaderboard
    pub fn projected_rank(&self) -> Option<usize> {
        potential_rank(&self.gateway.top_scores(), self.state.score)
    }
}

impl<G: Gateway> Drop for Session<G> {
    fn drop(&mut self) {
        self.teardown();
    }
}
