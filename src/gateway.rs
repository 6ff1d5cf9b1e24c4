//! Leaderboard collaborator seam
//!
//! The session talks to the leaderboard only through `Gateway`. Calls are
//! fire-and-forget: an implementation may finish the work later (the browser
//! gateway spawns fetches) and must log failures rather than return them, so
//! nothing on the tick path ever waits on the network.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use thiserror::Error;

use crate::leaderboard::{RecordIds, ScoreBoard};
use crate::player::PlayerId;

pub use crate::leaderboard::TopScore;

/// Leaderboard operations a session needs
pub trait Gateway {
    /// Record a finished session's score. On success the implementation
    /// refreshes its cached top scores.
    fn submit_score(&self, player: &PlayerId, score: u64);

    /// Start refreshing the cached top scores
    fn refresh_top_scores(&self);

    /// Most recently fetched top scores, highest first
    fn top_scores(&self) -> Vec<TopScore>;

    /// Best-effort position report
    fn report_position(&self, pos: Vec2);
}

/// Why a leaderboard call failed
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// JSON bodies shared by the HTTP service and its clients
pub mod wire {
    use serde::{Deserialize, Serialize};

    /// `{data}` envelope for reads
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Data<T> {
        pub data: T,
    }

    /// `{message, data}` envelope for successful writes
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Saved<T> {
        pub message: String,
        pub data: T,
    }

    /// `{error}` body for failed requests
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
    }

    /// POST /api/player-score body. Fields are optional so a missing one is
    /// reported as a 400 rather than a decode failure.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ScoreSubmission {
        #[serde(rename = "playerId", default, skip_serializing_if = "Option::is_none")]
        pub player_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub score: Option<u64>,
    }

    /// POST /api/ball-position body
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct PositionReport {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub x: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub y: Option<f64>,
    }
}

/// One leaderboard call, ready for an HTTP client to send
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: &'static str,
    pub path: &'static str,
    /// JSON body, if any
    pub body: Option<String>,
    /// Must survive the page unloading. The final score is sent from the
    /// unload path, and browsers cancel plain fetches at that point.
    pub keepalive: bool,
}

impl ApiRequest {
    pub fn submit_score(player: &PlayerId, score: u64) -> Result<Self, GatewayError> {
        let body = wire::ScoreSubmission {
            player_id: Some(player.as_str().to_string()),
            score: Some(score),
        };
        Ok(Self {
            method: "POST",
            path: "/api/player-score",
            body: Some(serde_json::to_string(&body)?),
            keepalive: true,
        })
    }

    pub fn report_position(pos: Vec2) -> Result<Self, GatewayError> {
        let body = wire::PositionReport {
            x: Some(f64::from(pos.x)),
            y: Some(f64::from(pos.y)),
        };
        Ok(Self {
            method: "POST",
            path: "/api/ball-position",
            body: Some(serde_json::to_string(&body)?),
            keepalive: false,
        })
    }

    pub fn top_scores() -> Self {
        Self {
            method: "GET",
            path: "/api/top-scores",
            body: None,
            keepalive: false,
        }
    }
}

/// Snapshot of what a `LocalGateway` has been asked to do
#[derive(Debug, Clone, Default)]
pub struct LocalLog {
    pub submissions: u32,
    pub refreshes: u32,
    pub reports: Vec<(f32, f32)>,
}

#[derive(Debug, Default)]
struct LocalInner {
    board: ScoreBoard,
    ids: RecordIds,
    cached: Vec<TopScore>,
    log: LocalLog,
}

/// In-process leaderboard, for the native driver and tests
///
/// Cloning shares the same board, so a caller can keep a handle while a
/// session owns another.
#[derive(Debug, Clone, Default)]
pub struct LocalGateway {
    inner: Rc<RefCell<LocalInner>>,
}

impl LocalGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing board
    pub fn with_board(board: ScoreBoard) -> Self {
        let gateway = Self::default();
        gateway.inner.borrow_mut().board = board;
        gateway
    }

    pub fn board(&self) -> ScoreBoard {
        self.inner.borrow().board.clone()
    }

    pub fn log(&self) -> LocalLog {
        self.inner.borrow().log.clone()
    }
}

impl Gateway for LocalGateway {
    fn submit_score(&self, player: &PlayerId, score: u64) {
        {
            let mut inner = self.inner.borrow_mut();
            let timestamp = crate::now_millis();
            let id = inner.ids.next(timestamp);
            inner.board.insert(crate::leaderboard::PlayerScoreRecord {
                id,
                player_id: player.as_str().to_string(),
                score,
                timestamp,
            });
            inner.log.submissions += 1;
        }
        log::info!("Score {} saved for {}", score, player);
        self.refresh_top_scores();
    }

    fn refresh_top_scores(&self) {
        let mut inner = self.inner.borrow_mut();
        let top = inner.board.top_scores();
        inner.cached = top;
        inner.log.refreshes += 1;
    }

    fn top_scores(&self) -> Vec<TopScore> {
        self.inner.borrow().cached.clone()
    }

    fn report_position(&self, pos: Vec2) {
        self.inner.borrow_mut().log.reports.push((pos.x, pos.y));
    }
}
