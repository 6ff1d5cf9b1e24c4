//! Keyboard input tracking
//!
//! Key-down/key-up edges update the held set. The jump key is the only edge
//! with an immediate effect on the simulation: an upward impulse, gated by
//! the jump flag.

use std::collections::HashSet;

use super::state::SimState;
use crate::tuning::Tuning;

/// Keys the simulation reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Jump,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "ArrowUp" => Some(Key::Jump),
            _ => None,
        }
    }
}

/// Set of keys currently pressed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    keys: HashSet<Key>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Net horizontal direction: -1, 0 or 1
    pub fn horizontal(&self) -> f32 {
        let mut dir = 0.0;
        if self.is_held(Key::Left) {
            dir -= 1.0;
        }
        if self.is_held(Key::Right) {
            dir += 1.0;
        }
        dir
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns true if the key was not already held
    fn press(&mut self, key: Key) -> bool {
        self.keys.insert(key)
    }

    fn release(&mut self, key: Key) -> bool {
        self.keys.remove(&key)
    }

    fn clear(&mut self) {
        self.keys.clear();
    }
}

impl FromIterator<Key> for HeldKeys {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Turns raw key events into held-key state and jump impulses
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    held: HeldKeys,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys the next tick will read
    pub fn held(&self) -> &HeldKeys {
        &self.held
    }

    /// Record a key-down. Auto-repeat of a held key is not an edge.
    ///
    /// Returns true if a jump impulse was applied.
    pub fn key_down(&mut self, key: Key, state: &mut SimState, tuning: &Tuning) -> bool {
        if !self.held.press(key) {
            return false;
        }
        if key == Key::Jump && !state.jumping {
            state.vel.y = tuning.jump_force;
            state.jumping = true;
            log::debug!("jump at tick {} from y={}", state.time_ticks, state.pos.y);
            return true;
        }
        false
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.release(key);
    }

    /// Forget every held key (focus loss, teardown)
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}
