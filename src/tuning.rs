//! Data-driven physics parameters
//!
//! Every value here is expressed per tick, never per second, so the
//! integrator stays independent of the display refresh rate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which velocity the position integration uses within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Integration {
    /// Integrate position with the velocity after gravity was applied
    #[default]
    SemiImplicitEuler,
    /// Integrate position with the velocity committed by the previous tick
    ExplicitEuler,
}

/// Rectangular play field (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    pub ball_size: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            ball_size: BALL_SIZE,
        }
    }
}

impl Field {
    /// Largest x the ball's top-left corner may take
    pub fn max_x(&self) -> f32 {
        (self.width - self.ball_size).max(0.0)
    }

    /// Largest y the ball's top-left corner may take (the floor)
    pub fn floor(&self) -> f32 {
        (self.height - self.ball_size).max(0.0)
    }

    /// Whether a position satisfies the bounds invariant
    pub fn contains(&self, pos: Vec2) -> bool {
        (0.0..=self.max_x()).contains(&pos.x) && (0.0..=self.floor()).contains(&pos.y)
    }
}

/// Physics tuning for one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub field: Field,
    pub gravity: f32,
    pub jump_force: f32,
    pub move_speed: f32,
    pub start_x: f32,
    #[serde(default)]
    pub integration: Integration,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field: Field::default(),
            gravity: GRAVITY,
            jump_force: JUMP_FORCE,
            move_speed: MOVE_SPEED,
            start_x: START_X,
            integration: Integration::default(),
        }
    }
}

impl Tuning {
    /// Spawn point: `start_x` on the floor, clamped into the field
    pub fn spawn_position(&self) -> Vec2 {
        Vec2::new(
            self.start_x.clamp(0.0, self.field.max_x()),
            self.field.floor(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_field_limits() {
        let field = Field::default();
        assert_eq!(field.max_x(), 770.0);
        assert_eq!(field.floor(), 470.0);
        assert!(field.contains(Vec2::new(0.0, 0.0)));
        assert!(field.contains(Vec2::new(770.0, 470.0)));
        assert!(!field.contains(Vec2::new(770.5, 10.0)));
        assert!(!field.contains(Vec2::new(10.0, -0.1)));
    }

    #[test]
    fn test_spawn_on_floor() {
        let tuning = Tuning::default();
        assert_eq!(tuning.spawn_position(), Vec2::new(50.0, 470.0));
    }

    #[test]
    fn test_spawn_clamped_into_narrow_field() {
        let tuning = Tuning {
            field: Field {
                width: 40.0,
                height: 40.0,
                ball_size: 30.0,
            },
            ..Default::default()
        };
        assert_eq!(tuning.spawn_position(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_integration_defaults_when_missing() {
        let json = r#"{
            "field": {"width": 800.0, "height": 500.0, "ball_size": 30.0},
            "gravity": 0.5, "jump_force": -10.0, "move_speed": 5.0, "start_x": 50.0
        }"#;
        let tuning: Tuning = serde_json::from_str(json).unwrap();
        assert_eq!(tuning.integration, Integration::SemiImplicitEuler);
        assert_eq!(tuning, Tuning::default());
    }
}
