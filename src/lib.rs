//! Ball Jump - a gravity ball toy with a leaderboard
//!
//! Core modules:
//! - `sim`: Deterministic simulation (fixed-tick integrator, input edges, clocks)
//! - `session`: One player's run from mount to teardown
//! - `gateway`: Leaderboard collaborator seam used by the session
//! - `leaderboard`: Score aggregation shared by the service and local gateway
//! - `platform`: Browser-specific glue (fetch gateway)
//! - `persistence`: Versioned JSON store on disk (native)
//! - `server`: REST leaderboard service (native)

pub mod gateway;
pub mod leaderboard;
#[cfg(not(target_arch = "wasm32"))]
pub mod persistence;
pub mod platform;
pub mod player;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use gateway::{Gateway, LocalGateway, TopScore};
pub use leaderboard::ScoreBoard;
pub use player::PlayerId;
pub use session::Session;
pub use settings::Settings;
pub use tuning::{Field, Integration, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_HZ: u32 = 60;
    /// Wall-clock length of one tick in seconds. Scheduling only, physics is per tick.
    pub const SIM_DT: f64 = 1.0 / TICK_HZ as f64;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the clock (seconds)
    pub const MAX_FRAME_DT: f64 = 0.1;

    /// Play field dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 500.0;
    /// Ball bounding box edge (pixels)
    pub const BALL_SIZE: f32 = 30.0;
    /// Spawn x coordinate
    pub const START_X: f32 = 50.0;

    /// Downward acceleration (px/tick²)
    pub const GRAVITY: f32 = 0.5;
    /// Vertical velocity set by a jump (px/tick, negative is up)
    pub const JUMP_FORCE: f32 = -10.0;
    /// Horizontal displacement per tick while an arrow key is held
    pub const MOVE_SPEED: f32 = 5.0;

    /// Seconds between best-effort position reports
    pub const POSITION_REPORT_SECS: f64 = 5.0;
    /// Size of every leaderboard listing
    pub const MAX_TOP_SCORES: usize = 10;
}

/// Current Unix time in milliseconds
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Current Unix time in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}
