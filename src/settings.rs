//! Client settings
//!
//! Read from LocalStorage, separate from the player id. The page (or a
//! developer console) writes them; the game only reads.

use serde::{Deserialize, Serialize};

use crate::consts::POSITION_REPORT_SECS;
use crate::tuning::Tuning;

/// Client settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Leaderboard service root, without trailing slash (empty = same origin)
    #[serde(default)]
    pub api_base_url: String,
    /// Seconds between position reports (0 disables reporting)
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: f64,
    /// Show the top scores panel
    #[serde(default = "default_true")]
    pub show_leaderboard: bool,
    /// Physics tuning
    #[serde(default)]
    pub tuning: Tuning,
}

fn default_report_interval() -> f64 {
    POSITION_REPORT_SECS
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            report_interval_secs: POSITION_REPORT_SECS,
            show_leaderboard: true,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Absolute or origin-relative URL for an API path such as `/api/top-scores`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "ball_jump_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native builds always run with defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_joins_paths() {
        let mut settings = Settings::default();
        assert_eq!(settings.api_url("/api/top-scores"), "/api/top-scores");

        settings.api_base_url = "http://localhost:3000/".into();
        assert_eq!(
            settings.api_url("/api/top-scores"),
            "http://localhost:3000/api/top-scores"
        );
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"api_base_url": "http://example.test"}"#).unwrap();
        assert_eq!(settings.api_base_url, "http://example.test");
        assert_eq!(settings.report_interval_secs, 5.0);
        assert!(settings.show_leaderboard);
        assert_eq!(settings.tuning, Tuning::default());
    }
}
