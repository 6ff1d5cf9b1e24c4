//! Leaderboard REST service
//!
//! Routes (all under `/api`):
//! - `GET  /top-scores`            best score per player, top 10
//! - `POST /player-score`          record `{playerId, score}`
//! - `GET  /player-score?playerId` one player's top 10
//! - `POST /ball-position`         record `{x, y}`
//! - `GET  /ball-position`         latest reported position
//! - `GET  /hello`, `GET /status`  liveness
//!
//! The store is injected through `AppState`; handlers never reach for a
//! process-wide handle.

pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::gateway::wire::{Data, ErrorBody, PositionReport, Saved, ScoreSubmission};
use crate::leaderboard::{PlayerScoreRecord, TopScore};
use crate::persistence::PersistenceError;
pub use store::{BallPositionRecord, Store};

/// Service configuration, read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            db_path: "leaderboard.json".to_string(),
        }
    }
}

impl ServerConfig {
    /// `HOST`, `PORT` and `LEADERBOARD_DB`, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            db_path: std::env::var("LEADERBOARD_DB").unwrap_or(defaults.db_path),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

/// Request failures, each terminal for its own request only
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Internal server error")]
    Internal(#[from] PersistenceError),
    #[error("Internal server error")]
    Worker(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(source) => {
                log::error!("Storage failure: {}", source);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Worker(source) => {
                log::error!("Storage worker failed: {}", source);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct PlayerQuery {
    #[serde(rename = "playerId")]
    player_id: Option<String>,
}

/// Build the router over the given state
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/hello", get(hello))
        .route("/status", get(status))
        .route("/top-scores", get(top_scores))
        .route("/player-score", get(player_scores).post(save_score))
        .route("/ball-position", get(latest_position).post(save_position));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: ServerConfig, store: Store) -> anyhow::Result<()> {
    let app = router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    let addr: SocketAddr = listener.local_addr()?;
    log::info!("Leaderboard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Leaderboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Run a store write on the blocking pool. The write flushes to disk, so it
/// must not hold up an async worker; the lock is held until the flush ends.
async fn write_store<T, F>(state: &AppState, write: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut Store) -> Result<T, PersistenceError> + Send + 'static,
{
    let mut store = Arc::clone(&state.store).lock_owned().await;
    let record = tokio::task::spawn_blocking(move || write(&mut *store)).await??;
    Ok(record)
}

async fn hello() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Hello from API!" }))
}

async fn status() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": crate::now_millis(),
    }))
}

async fn top_scores(State(state): State<AppState>) -> Json<Data<Vec<TopScore>>> {
    let store = state.store.lock().await;
    Json(Data {
        data: store.top_scores(),
    })
}

async fn player_scores(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<Data<Vec<PlayerScoreRecord>>>, ApiError> {
    let player_id = query
        .player_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing playerId".to_string()))?;
    let store = state.store.lock().await;
    Ok(Json(Data {
        data: store.player_scores(&player_id),
    }))
}

async fn save_score(
    State(state): State<AppState>,
    body: Result<Json<ScoreSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<Saved<PlayerScoreRecord>>), ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (Some(player_id), Some(score)) = (body.player_id.filter(|id| !id.is_empty()), body.score)
    else {
        return Err(ApiError::BadRequest("Missing playerId or score".to_string()));
    };

    let record = write_store(&state, move |store| store.add_score(&player_id, score)).await?;
    log::info!("Saved score {} for {}", record.score, record.player_id);
    Ok((
        StatusCode::CREATED,
        Json(Saved {
            message: "Player score saved".to_string(),
            data: record,
        }),
    ))
}

async fn save_position(
    State(state): State<AppState>,
    body: Result<Json<PositionReport>, JsonRejection>,
) -> Result<(StatusCode, Json<Saved<BallPositionRecord>>), ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (Some(x), Some(y)) = (body.x, body.y) else {
        return Err(ApiError::BadRequest("Missing x or y coordinates".to_string()));
    };

    let record = write_store(&state, move |store| store.add_position(x, y)).await?;
    log::debug!("Saved ball position ({}, {})", record.x, record.y);
    Ok((
        StatusCode::CREATED,
        Json(Saved {
            message: "Ball position saved".to_string(),
            data: record,
        }),
    ))
}

async fn latest_position(
    State(state): State<AppState>,
) -> Result<Json<Data<BallPositionRecord>>, ApiError> {
    let store = state.store.lock().await;
    let latest = store
        .latest_position()
        .cloned()
        .ok_or_else(|| ApiError::NotFound("No ball position found".to_string()))?;
    Ok(Json(Data { data: latest }))
}
