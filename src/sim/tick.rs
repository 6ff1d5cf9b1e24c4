//! Fixed timestep simulation tick
//!
//! `step` is pure: it reads one snapshot of state and held keys and returns
//! the next state. Velocity and position are computed from locals in a
//! single pass, so nothing inside a tick can observe a half-applied update.

use glam::Vec2;

use super::input::HeldKeys;
use super::state::SimState;
use crate::tuning::{Integration, Tuning};

/// Compute the state one tick after `prev`
pub fn step(prev: &SimState, keys: &HeldKeys, tuning: &Tuning) -> SimState {
    let field = &tuning.field;

    // Gravity, from the velocity the previous tick committed
    let vy_prev = prev.vel.y;
    let mut vy = vy_prev + tuning.gravity;

    // Position, with the velocity snapshot chosen once for this tick
    let vy_integrated = match tuning.integration {
        Integration::SemiImplicitEuler => vy,
        Integration::ExplicitEuler => vy_prev,
    };
    let mut y = prev.pos.y + vy_integrated;

    // Horizontal impulse from held keys
    let dx = keys.horizontal() * tuning.move_speed;
    let x = (prev.pos.x + dx).clamp(0.0, field.max_x());

    let mut jumping = prev.jumping;
    if y < 0.0 {
        y = 0.0;
        vy = 0.0;
    }
    if y > field.floor() {
        y = field.floor();
        vy = 0.0;
        jumping = false;
    }

    let score = if x > prev.pos.x {
        prev.score + 1
    } else {
        prev.score
    };

    SimState {
        pos: Vec2::new(x, y),
        vel: Vec2::new(dx, vy),
        jumping,
        score,
        time_ticks: prev.time_ticks + 1,
    }
}

/// Advance the state in place by one tick
pub fn tick(state: &mut SimState, keys: &HeldKeys, tuning: &Tuning) {
    let next = step(state, keys, tuning);
    if next.jumping != state.jumping {
        log::trace!("landed at tick {} x={}", next.time_ticks, next.pos.x);
    }
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::{InputTracker, Key};
    use crate::tuning::Field;
    use proptest::prelude::*;

    fn keys(list: &[Key]) -> HeldKeys {
        list.iter().copied().collect()
    }

    #[test]
    fn test_resting_on_floor() {
        let tuning = Tuning::default();
        let mut state = SimState::new(&tuning);
        assert_eq!(state.pos, Vec2::new(50.0, 470.0));

        tick(&mut state, &HeldKeys::new(), &tuning);

        // 470 + 0.5 overshoots the floor and is clamped back
        assert_eq!(state.pos, Vec2::new(50.0, 470.0));
        assert_eq!(state.vel.y, 0.0);
        assert!(!state.jumping);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_first_tick_after_jump() {
        let tuning = Tuning::default();
        let mut state = SimState::new(&tuning);
        let mut input = InputTracker::new();

        input.key_down(Key::Jump, &mut state, &tuning);
        assert_eq!(state.vel.y, -10.0);
        assert!(state.jumping);

        tick(&mut state, input.held(), &tuning);
        assert_eq!(state.vel.y, -9.5);
        assert_eq!(state.pos.y, 460.5);
        assert!(state.jumping);
    }

    #[test]
    fn test_explicit_euler_uses_previous_velocity() {
        let tuning = Tuning {
            integration: Integration::ExplicitEuler,
            ..Default::default()
        };
        let mut state = SimState::new(&tuning);
        state.vel.y = -10.0;
        state.jumping = true;

        tick(&mut state, &HeldKeys::new(), &tuning);
        assert_eq!(state.vel.y, -9.5);
        assert_eq!(state.pos.y, 460.0);
    }

    #[test]
    fn test_jump_arc_lands_and_resets() {
        let tuning = Tuning::default();
        let mut state = SimState::new(&tuning);
        let mut input = InputTracker::new();
        input.key_down(Key::Jump, &mut state, &tuning);
        input.key_up(Key::Jump);

        let mut ticks = 0;
        let mut apex = state.pos.y;
        while state.jumping {
            tick(&mut state, input.held(), &tuning);
            apex = apex.min(state.pos.y);
            ticks += 1;
            assert!(ticks < 100, "ball never landed");
        }

        assert_eq!(state.pos.y, 470.0);
        assert_eq!(state.vel.y, 0.0);
        // Sum of 9.5, 9.0, ... 0.5
        assert_eq!(apex, 470.0 - 95.0);

        // Landing re-enables the jump
        assert!(input.key_down(Key::Jump, &mut state, &tuning));
        assert_eq!(state.vel.y, -10.0);
    }

    #[test]
    fn test_ceiling_zeroes_velocity_keeps_jump_flag() {
        let tuning = Tuning {
            field: Field {
                width: 800.0,
                height: 60.0,
                ball_size: 30.0,
            },
            ..Default::default()
        };
        let mut state = SimState::new(&tuning);
        state.vel.y = -10.0;
        state.jumping = true;

        tick(&mut state, &HeldKeys::new(), &tuning);
        assert_eq!(state.pos.y, 20.5);
        tick(&mut state, &HeldKeys::new(), &tuning);
        assert_eq!(state.pos.y, 11.5);
        tick(&mut state, &HeldKeys::new(), &tuning);
        assert_eq!(state.pos.y, 3.0);
        tick(&mut state, &HeldKeys::new(), &tuning);
        assert_eq!(state.pos.y, 0.0);
        assert_eq!(state.vel.y, 0.0);
        assert!(state.jumping);
    }

    #[test]
    fn test_horizontal_movement_and_score() {
        let tuning = Tuning::default();
        let mut state = SimState::new(&tuning);

        tick(&mut state, &keys(&[Key::Right]), &tuning);
        assert_eq!(state.pos.x, 55.0);
        assert_eq!(state.vel.x, 5.0);
        assert_eq!(state.score, 1);

        tick(&mut state, &keys(&[Key::Left]), &tuning);
        assert_eq!(state.pos.x, 50.0);
        assert_eq!(state.vel.x, -5.0);
        assert_eq!(state.score, 1);

        tick(&mut state, &keys(&[Key::Left, Key::Right]), &tuning);
        assert_eq!(state.pos.x, 50.0);
        assert_eq!(state.vel.x, 0.0);
        assert_eq!(state.score, 1);

        // Horizontal velocity is not carried into a tick with no keys
        tick(&mut state, &HeldKeys::new(), &tuning);
        assert_eq!(state.pos.x, 50.0);
        assert_eq!(state.vel.x, 0.0);
    }

    #[test]
    fn test_right_wall_stops_scoring() {
        let tuning = Tuning::default();
        let mut state = SimState::new(&tuning);
        state.pos.x = 768.0;

        tick(&mut state, &keys(&[Key::Right]), &tuning);
        assert_eq!(state.pos.x, 770.0);
        assert_eq!(state.score, 1);

        tick(&mut state, &keys(&[Key::Right]), &tuning);
        assert_eq!(state.pos.x, 770.0);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_left_wall_clamp() {
        let tuning = Tuning::default();
        let mut state = SimState::new(&tuning);
        state.pos.x = 3.0;

        tick(&mut state, &keys(&[Key::Left]), &tuning);
        assert_eq!(state.pos.x, 0.0);
        tick(&mut state, &keys(&[Key::Left]), &tuning);
        assert_eq!(state.pos.x, 0.0);
    }

    #[test]
    fn test_step_is_pure() {
        let tuning = Tuning::default();
        let mut state = SimState::new(&tuning);
        state.vel.y = -6.0;
        state.jumping = true;
        let snapshot = state;

        let a = step(&state, &keys(&[Key::Right]), &tuning);
        let b = step(&state, &keys(&[Key::Right]), &tuning);
        assert_eq!(a, b);
        assert_eq!(state, snapshot);
    }

    /// One scripted event aligned to a tick boundary
    #[derive(Debug, Clone, Copy)]
    enum Event {
        Down(Key),
        Up(Key),
        Ticks(u8),
    }

    fn key_strategy() -> impl Strategy<Value = Key> {
        prop_oneof![Just(Key::Left), Just(Key::Right), Just(Key::Jump)]
    }

    fn event_strategy() -> impl Strategy<Value = Event> {
        prop_oneof![
            key_strategy().prop_map(Event::Down),
            key_strategy().prop_map(Event::Up),
            (1u8..40).prop_map(Event::Ticks),
        ]
    }

    fn tuning_strategy() -> impl Strategy<Value = Tuning> {
        (
            40.0f32..1000.0,
            40.0f32..600.0,
            1.0f32..40.0,
            0.1f32..2.0,
            -25.0f32..-1.0,
            prop_oneof![
                Just(Integration::SemiImplicitEuler),
                Just(Integration::ExplicitEuler)
            ],
        )
            .prop_map(|(width, height, ball_size, gravity, jump_force, integration)| Tuning {
                field: Field {
                    width,
                    height,
                    ball_size,
                },
                gravity,
                jump_force,
                integration,
                ..Default::default()
            })
    }

    /// Replay events, returning the state after every committed tick
    fn replay(tuning: &Tuning, events: &[Event]) -> Vec<SimState> {
        let mut state = SimState::new(tuning);
        let mut input = InputTracker::new();
        let mut trace = Vec::new();
        for event in events {
            match *event {
                Event::Down(key) => {
                    input.key_down(key, &mut state, tuning);
                }
                Event::Up(key) => input.key_up(key),
                Event::Ticks(n) => {
                    for _ in 0..n {
                        let prev = state;
                        tick(&mut state, input.held(), tuning);
                        trace.push(prev);
                        trace.push(state);
                    }
                }
            }
        }
        trace
    }

    proptest! {
        #[test]
        fn prop_bounds_hold_after_every_tick(
            tuning in tuning_strategy(),
            events in prop::collection::vec(event_strategy(), 0..60),
        ) {
            let trace = replay(&tuning, &events);
            for pair in trace.chunks(2) {
                let after = pair[1];
                prop_assert!(tuning.field.contains(after.pos), "{:?} escaped {:?}", after.pos, tuning.field);
            }
        }

        #[test]
        fn prop_score_counts_rightward_ticks(
            events in prop::collection::vec(event_strategy(), 0..60),
        ) {
            let tuning = Tuning::default();
            let trace = replay(&tuning, &events);
            for pair in trace.chunks(2) {
                let (before, after) = (pair[0], pair[1]);
                let expected = before.score + u64::from(after.pos.x > before.pos.x);
                prop_assert_eq!(after.score, expected);
                prop_assert!(after.score >= before.score);
            }
        }

        #[test]
        fn prop_jump_flag_clears_only_on_floor(
            events in prop::collection::vec(event_strategy(), 0..60),
        ) {
            let tuning = Tuning::default();
            let trace = replay(&tuning, &events);
            for pair in trace.chunks(2) {
                let (before, after) = (pair[0], pair[1]);
                if before.jumping && !after.jumping {
                    prop_assert_eq!(after.pos.y, tuning.field.floor());
                    prop_assert_eq!(after.vel.y, 0.0);
                }
            }
        }

        #[test]
        fn prop_replay_is_deterministic(
            tuning in tuning_strategy(),
            events in prop::collection::vec(event_strategy(), 0..60),
        ) {
            prop_assert_eq!(replay(&tuning, &events), replay(&tuning, &events));
        }
    }
}
