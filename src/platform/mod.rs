//! Platform abstraction layer
//!
//! Browser-only pieces live in `web`:
//! - Leaderboard gateway over `fetch`
//!
//! Storage (LocalStorage) is handled next to the types it persists
//! (`PlayerId`, `Settings`) with native fallbacks.

#[cfg(target_arch = "wasm32")]
pub mod web;
