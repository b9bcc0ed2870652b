//! Property-based tests using proptest
//!
//! Invariants that must hold for ALL inputs:
//! - Player: integrity, energy and height stay in range for any frame sizes
//! - Obstacles: the disabled flag never reverts
//! - Progression: level index is monotonic in progress
//! - Clock: deltas are always finite and clamped

use proptest::prelude::*;
use std::collections::HashSet;

use sleigh_ride::consts::{MAX_FRAME_DT, MAX_INTEGRITY};
use sleigh_ride::sim::{FrameClock, GameState, TickInput, select_level, tick};
use sleigh_ride::{GameConfig, SecondaryAction};

/// Busy world: lots of hazards and pickups
fn busy_config(secondary: SecondaryAction) -> GameConfig {
    let mut config = GameConfig {
        secondary,
        victory_distance: 20_000.0,
        ..Default::default()
    };
    config.spawn.obstacle_rate = 0.2;
    config.spawn.powerup_rate = 0.05;
    config.spawn.data_log_rate = 0.05;
    config
}

fn frame_dt() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => 0.0f32..0.05,
        2 => 0.05f32..5.0,
        1 => Just(f32::INFINITY),
        1 => Just(f32::NAN),
        1 => Just(-1.0f32),
    ]
}

fn inputs() -> impl Strategy<Value = Vec<(bool, bool, f32)>> {
    prop::collection::vec((any::<bool>(), prop::bool::weighted(0.1), frame_dt()), 1..300)
}

// ============================================================
// Player Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_player_state_stays_in_range(
        seed in any::<u64>(),
        phase in any::<bool>(),
        frames in inputs(),
    ) {
        let secondary = if phase { SecondaryAction::Phase } else { SecondaryAction::Emp };
        let config = busy_config(secondary);
        let mut state = GameState::new(&config, seed);
        let max_y = config.max_player_y();

        for (thrust, secondary, dt) in frames {
            tick(&mut state, &config, &TickInput { thrust, secondary }, dt);
            let player = &state.player;
            prop_assert!((0.0..=MAX_INTEGRITY).contains(&player.integrity));
            prop_assert!((0.0..=player.max_energy).contains(&player.energy));
            prop_assert!((0.0..=max_y).contains(&player.y()), "y = {}", player.y());
            prop_assert!(player.vy <= config.physics.max_fall_speed);
            prop_assert!(player.combo >= 1 && player.combo <= config.combat.max_combo);
        }
    }

    #[test]
    fn prop_height_bounds_hold_for_extreme_physics(
        gravity in 0.0f32..50.0,
        thrust_power in -80.0f32..0.0,
        max_fall_speed in 0.1f32..100.0,
        frames in inputs(),
    ) {
        let mut config = busy_config(SecondaryAction::Emp);
        config.physics.gravity = gravity;
        config.physics.thrust_power = thrust_power;
        config.physics.max_fall_speed = max_fall_speed;
        let mut state = GameState::new(&config, 9);
        let max_y = config.max_player_y();

        for (thrust, _, dt) in frames {
            tick(&mut state, &config, &TickInput { thrust, secondary: false }, dt);
            prop_assert!((0.0..=max_y).contains(&state.player.y()));
        }
    }
}

// ============================================================
// Obstacle Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_disabled_flag_never_reverts(seed in any::<u64>(), frames in inputs()) {
        let config = busy_config(SecondaryAction::Phase);
        let mut state = GameState::new(&config, seed);
        let mut disabled: HashSet<u32> = HashSet::new();

        for (thrust, secondary, dt) in frames {
            tick(&mut state, &config, &TickInput { thrust, secondary }, dt);
            for obstacle in &state.obstacles {
                if disabled.contains(&obstacle.id) {
                    prop_assert!(obstacle.is_disabled(), "obstacle {} re-enabled", obstacle.id);
                }
                if obstacle.is_disabled() {
                    disabled.insert(obstacle.id);
                }
            }
        }
    }

    #[test]
    fn prop_distance_never_decreases(seed in any::<u64>(), frames in inputs()) {
        let config = busy_config(SecondaryAction::Emp);
        let mut state = GameState::new(&config, seed);
        let mut last = 0.0f32;
        for (thrust, secondary, dt) in frames {
            tick(&mut state, &config, &TickInput { thrust, secondary }, dt);
            prop_assert!(state.distance >= last);
            last = state.distance;
        }
    }
}

// ============================================================
// Progression and Clock Properties
// ============================================================

proptest! {
    #[test]
    fn prop_level_index_is_monotonic(a in 0.0f32..200.0, b in 0.0f32..200.0) {
        let config = GameConfig::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let lo = select_level(&config.levels, low);
        let hi = select_level(&config.levels, high);
        prop_assert!(lo <= hi);
        prop_assert!(hi < config.levels.len());
    }

    #[test]
    fn prop_clock_delta_is_clamped(stamps in prop::collection::vec(any::<f64>(), 1..50)) {
        let mut clock = FrameClock::default();
        for now in stamps {
            let dt = clock.advance(now);
            prop_assert!(dt.is_finite());
            prop_assert!((0.0..=MAX_FRAME_DT).contains(&dt));
        }
    }
}
