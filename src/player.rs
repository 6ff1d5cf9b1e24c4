//! Player identity
//!
//! An opaque id generated on first launch and kept client-side, so the same
//! browser (or machine) submits under the same name across sessions.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

const ID_PREFIX: &str = "player_";
const ID_LEN: usize = 9;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque, stable player identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "playerId";

    /// Native id file, overridable with `BALL_JUMP_PLAYER_FILE`
    #[allow(dead_code)]
    const DEFAULT_FILE: &'static str = ".ball-jump-player";

    /// Derive an id from a seed (same seed, same id)
    pub fn generate(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let suffix: String = (0..ID_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Self(format!("{ID_PREFIX}{suffix}"))
    }

    /// Fresh id from OS randomness
    pub fn random() -> Self {
        Self::generate(rand::random())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accept a stored id if it is usable
    fn parse_stored(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Load the id from LocalStorage, creating and storing one if absent (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load_or_create() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::warn!("LocalStorage unavailable, using a throwaway player id");
            return Self::random();
        };

        if let Ok(Some(raw)) = storage.get_item(Self::STORAGE_KEY) {
            if let Some(id) = Self::parse_stored(&raw) {
                return id;
            }
        }

        let id = Self::random();
        if storage.set_item(Self::STORAGE_KEY, id.as_str()).is_err() {
            log::warn!("Failed to persist player id");
        }
        log::info!("Created player id {}", id);
        id
    }

    /// Load the id from the player file, creating it if absent
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_create() -> Self {
        let path = std::env::var("BALL_JUMP_PLAYER_FILE")
            .unwrap_or_else(|_| Self::DEFAULT_FILE.to_string());
        Self::load_or_create_at(std::path::Path::new(&path))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_create_at(path: &std::path::Path) -> Self {
        if let Ok(raw) = std::fs::read_to_string(path) {
            if let Some(id) = Self::parse_stored(&raw) {
                return id;
            }
        }

        let id = Self::random();
        match std::fs::write(path, id.as_str()) {
            Ok(()) => log::info!("Created player id {} in {}", id, path.display()),
            Err(e) => log::warn!("Failed to persist player id to {}: {}", path.display(), e),
        }
        id
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
