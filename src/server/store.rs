//! Leaderboard storage
//!
//! In-memory collections mirrored to a `JsonStore` after every write. A write
//! that cannot be persisted is rolled back so memory never runs ahead of disk.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::leaderboard::{PlayerScoreRecord, RecordIds, ScoreBoard, TopScore};
use crate::persistence::{JsonStore, PersistenceError};

/// One reported ball position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallPositionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Unix timestamp (ms) when reported
    pub timestamp: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    positions: Vec<BallPositionRecord>,
    scores: ScoreBoard,
    ids: RecordIds,
}

/// Positions and scores, optionally backed by a file
#[derive(Debug, Default)]
pub struct Store {
    data: StoreData,
    file: Option<JsonStore>,
}

impl Store {
    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or create) a file-backed store
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let file = JsonStore::new(path.as_ref());
        let data = file.load::<StoreData>()?.unwrap_or_default();
        log::info!(
            "Opened store {} ({} positions, {} scores)",
            file.path().display(),
            data.positions.len(),
            data.scores.records.len()
        );
        Ok(Self {
            data,
            file: Some(file),
        })
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        match &self.file {
            Some(file) => file.save(&self.data),
            None => Ok(()),
        }
    }

    pub fn add_position(&mut self, x: f64, y: f64) -> Result<BallPositionRecord, PersistenceError> {
        let timestamp = crate::now_millis();
        let record = BallPositionRecord {
            id: self.data.ids.next(timestamp),
            x,
            y,
            timestamp,
        };
        self.data.positions.push(record.clone());
        if let Err(e) = self.flush() {
            self.data.positions.pop();
            return Err(e);
        }
        Ok(record)
    }

    /// Most recent position; insertion order breaks timestamp ties
    pub fn latest_position(&self) -> Option<&BallPositionRecord> {
        self.data
            .positions
            .iter()
            .enumerate()
            .max_by_key(|(i, p)| (p.timestamp, *i))
            .map(|(_, p)| p)
    }

    pub fn add_score(
        &mut self,
        player_id: &str,
        score: u64,
    ) -> Result<PlayerScoreRecord, PersistenceError> {
        let timestamp = crate::now_millis();
        let record = PlayerScoreRecord {
            id: self.data.ids.next(timestamp),
            player_id: player_id.to_string(),
            score,
            timestamp,
        };
        self.data.scores.insert(record.clone());
        if let Err(e) = self.flush() {
            self.data.scores.records.pop();
            return Err(e);
        }
        Ok(record)
    }

    pub fn top_scores(&self) -> Vec<TopScore> {
        self.data.scores.top_scores()
    }

    pub fn player_scores(&self, player_id: &str) -> Vec<PlayerScoreRecord> {
        self.data.scores.player_scores(player_id)
    }
}
