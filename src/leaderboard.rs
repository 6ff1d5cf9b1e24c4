//! Leaderboard aggregation
//!
//! Raw score submissions are kept as records; listings are derived on read.
//! Shared by the HTTP service and the in-process gateway.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_TOP_SCORES;

/// One submitted score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScoreRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "playerId")]
    pub player_id: String,
    pub score: u64,
    /// Unix timestamp (ms) when submitted
    pub timestamp: u64,
}

/// A player's best score, as listed on the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopScore {
    #[serde(rename = "_id")]
    pub player_id: String,
    #[serde(rename = "maxScore")]
    pub max_score: u64,
}

/// Allocates record ids: creation time followed by a sequence number, in hex
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordIds {
    next_seq: u64,
}

impl RecordIds {
    pub fn next(&mut self, timestamp: u64) -> String {
        let seq = self.next_seq;
        self.next_seq += 1;
        format!("{:012x}{:012x}", timestamp, seq)
    }
}

/// All score submissions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub records: Vec<PlayerScoreRecord>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn insert(&mut self, record: PlayerScoreRecord) {
        self.records.push(record);
    }

    /// Best score per player, highest first, at most `MAX_TOP_SCORES`
    ///
    /// Ties are broken by player id so listings are stable.
    pub fn top_scores(&self) -> Vec<TopScore> {
        let mut best: HashMap<&str, u64> = HashMap::new();
        for record in &self.records {
            let entry = best.entry(record.player_id.as_str()).or_insert(record.score);
            *entry = (*entry).max(record.score);
        }

        let mut top: Vec<TopScore> = best
            .into_iter()
            .map(|(player_id, max_score)| TopScore {
                player_id: player_id.to_string(),
                max_score,
            })
            .collect();
        top.sort_by(|a, b| {
            b.max_score
                .cmp(&a.max_score)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        top.truncate(MAX_TOP_SCORES);
        top
    }

    /// One player's submissions, highest first, at most `MAX_TOP_SCORES`
    pub fn player_scores(&self, player_id: &str) -> Vec<PlayerScoreRecord> {
        let mut scores: Vec<PlayerScoreRecord> = self
            .records
            .iter()
            .filter(|r| r.player_id == player_id)
            .cloned()
            .collect();
        scores.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        scores.truncate(MAX_TOP_SCORES);
        scores
    }
}

/// Check if a score would make it onto a listing
pub fn qualifies(top: &[TopScore], score: u64) -> bool {
    if score == 0 {
        return false;
    }
    if top.len() < MAX_TOP_SCORES {
        return true;
    }
    // Check if score beats the lowest entry
    top.last().map(|e| score > e.max_score).unwrap_or(true)
}

/// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
pub fn potential_rank(top: &[TopScore], score: u64) -> Option<usize> {
    if !qualifies(top, score) {
        return None;
    }
    let rank = top.iter().position(|e| score > e.max_score);
    Some(rank.unwrap_or(top.len()) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ids: &mut RecordIds, player: &str, score: u64, timestamp: u64) -> PlayerScoreRecord {
        PlayerScoreRecord {
            id: ids.next(timestamp),
            player_id: player.to_string(),
            score,
            timestamp,
        }
    }

    #[test]
    fn test_record_ids_unique_and_ordered() {
        let mut ids = RecordIds::default();
        let a = ids.next(1_000);
        let b = ids.next(1_000);
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(a.len(), 24);
    }

    #[test]
    fn test_top_scores_groups_by_player_max() {
        let mut ids = RecordIds::default();
        let mut board = ScoreBoard::new();
        board.insert(record(&mut ids, "alice", 10, 1));
        board.insert(record(&mut ids, "bob", 25, 2));
        board.insert(record(&mut ids, "alice", 40, 3));
        board.insert(record(&mut ids, "alice", 5, 4));

        let top = board.top_scores();
        assert_eq!(
            top,
            vec![
                TopScore {
                    player_id: "alice".into(),
                    max_score: 40
                },
                TopScore {
                    player_id: "bob".into(),
                    max_score: 25
                },
            ]
        );
    }

    #[test]
    fn test_top_scores_limited_to_ten() {
        let mut ids = RecordIds::default();
        let mut board = ScoreBoard::new();
        for i in 0..15u64 {
            board.insert(record(&mut ids, &format!("p{i:02}"), i * 3, i));
        }
        let top = board.top_scores();
        assert_eq!(top.len(), MAX_TOP_SCORES);
        assert_eq!(top[0].max_score, 42);
        assert!(top.windows(2).all(|w| w[0].max_score >= w[1].max_score));
    }

    #[test]
    fn test_top_score_ties_are_stable() {
        let mut ids = RecordIds::default();
        let mut board = ScoreBoard::new();
        board.insert(record(&mut ids, "zed", 7, 1));
        board.insert(record(&mut ids, "amy", 7, 2));
        let top = board.top_scores();
        assert_eq!(top[0].player_id, "amy");
        assert_eq!(top[1].player_id, "zed");
    }

    #[test]
    fn test_player_scores_sorted_and_filtered() {
        let mut ids = RecordIds::default();
        let mut board = ScoreBoard::new();
        for (i, score) in [3u64, 9, 1, 12, 9].iter().enumerate() {
            board.insert(record(&mut ids, "alice", *score, i as u64));
        }
        board.insert(record(&mut ids, "bob", 100, 9));

        let scores: Vec<u64> = board.player_scores("alice").iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![12, 9, 9, 3, 1]);
        assert!(board.player_scores("carol").is_empty());
    }

    #[test]
    fn test_serialized_field_names() {
        let top = TopScore {
            player_id: "alice".into(),
            max_score: 4,
        };
        let json = serde_json::to_value(&top).unwrap();
        assert_eq!(json, serde_json::json!({"_id": "alice", "maxScore": 4}));
    }

    #[test]
    fn test_potential_rank() {
        let top: Vec<TopScore> = [50u64, 30, 10]
            .iter()
            .map(|s| TopScore {
                player_id: format!("p{s}"),
                max_score: *s,
            })
            .collect();

        assert_eq!(potential_rank(&top, 0), None);
        assert_eq!(potential_rank(&top, 60), Some(1));
        assert_eq!(potential_rank(&top, 30), Some(3));
        assert_eq!(potential_rank(&top, 5), Some(4));

        let full: Vec<TopScore> = (1..=10u64)
            .rev()
            .map(|s| TopScore {
                player_id: format!("p{s}"),
                max_score: s * 10,
            })
            .collect();
        assert_eq!(potential_rank(&full, 10), None);
        assert_eq!(potential_rank(&full, 11), Some(10));
    }
}
