//! Probabilistic entity spawning
//!
//! One roll per category per tick, so entity growth is bounded no matter how
//! large the frame delta is.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::state::{DataLog, GameState, Obstacle, ObstacleKind, Powerup, PowerupKind, Rect};
use crate::config::{GameConfig, ObstacleType, ObstacleWeight};
use crate::consts::REFERENCE_FPS;

/// What spawned this tick (for tests and debug logging)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub obstacle: bool,
    pub powerup: bool,
    pub data_log: bool,
}

/// Roll every spawn category once
pub fn spawn_entities(state: &mut GameState, config: &GameConfig, dt: f32) -> SpawnReport {
    let mut report = SpawnReport::default();
    if state.ending.is_active() {
        return report;
    }

    let time_scale = dt.max(0.0) * REFERENCE_FPS;
    let level = config.level(state.level_index);

    let obstacle_chance = config.spawn.obstacle_rate * level.spawn_rate * time_scale;
    if roll(state, obstacle_chance) {
        if let Some(kind) = pick_weighted(state, &level.obstacles) {
            spawn_obstacle(state, config, kind);
            report.obstacle = true;
        }
    }

    if roll(state, config.spawn.powerup_rate * time_scale) {
        let index = state.rng.random_range(0..PowerupKind::ALL.len());
        spawn_powerup(state, config, PowerupKind::ALL[index]);
        report.powerup = true;
    }

    if config.is_story()
        && !config.narrative.data_logs.is_empty()
        && roll(state, config.spawn.data_log_rate * time_scale)
    {
        let index = state.rng.random_range(0..config.narrative.data_logs.len());
        let message = config.narrative.data_logs[index].clone();
        let physics = &config.physics;
        let id = state.next_entity_id();
        let y = state.rng.random::<f32>() * (physics.playfield_height - 200.0).max(0.0);
        state.data_logs.push(DataLog::new(
            id,
            Rect::new(physics.playfield_width, y, 30.0, 20.0),
            message,
            false,
        ));
        report.data_log = true;
    }

    report
}

/// Uniform draw against a per-tick chance (clamped to [0, 1])
fn roll(state: &mut GameState, chance: f32) -> bool {
    if chance.is_nan() || chance <= 0.0 {
        return false;
    }
    state.rng.random::<f32>() < chance.min(1.0)
}

/// Weighted pick from a level's legal set; `None` if nothing is pickable
pub fn pick_weighted(state: &mut GameState, weights: &[ObstacleWeight]) -> Option<ObstacleType> {
    let total: f32 = weights.iter().map(|w| w.weight.max(0.0)).sum();
    if total.is_nan() || total <= 0.0 {
        return None;
    }
    let mut r = state.rng.random::<f32>() * total;
    for entry in weights {
        let weight = entry.weight.max(0.0);
        if r < weight {
            return Some(entry.kind);
        }
        r -= weight;
    }
    // Float rounding can leave r == total; fall back to the last pickable entry
    weights.iter().rev().find(|w| w.weight > 0.0).map(|w| w.kind)
}

/// Place an obstacle just past the right edge using its kind's rules
pub fn spawn_obstacle(state: &mut GameState, config: &GameConfig, kind: ObstacleType) {
    let physics = &config.physics;
    let height = physics.playfield_height;
    let x = physics.playfield_width + config.spawn.obstacle_margin;
    let floating_y =
        |rng: &mut rand_pcg::Pcg32, h: f32| rng.random::<f32>() * (height - h).max(0.0);

    let (rect, obstacle_kind) = match kind {
        ObstacleType::ServerTower => {
            // Ground-anchored
            (Rect::new(x, height - 200.0, 60.0, 200.0), ObstacleKind::ServerTower)
        }
        ObstacleType::EnergyBarrier => {
            let y = floating_y(&mut state.rng, 150.0);
            (Rect::new(x, y, 30.0, 150.0), ObstacleKind::EnergyBarrier)
        }
        ObstacleType::Debris => {
            let y = floating_y(&mut state.rng, 100.0);
            (Rect::new(x, y, 50.0, 50.0), ObstacleKind::Debris { spin: 0.05 })
        }
        ObstacleType::Drone => {
            let y = floating_y(&mut state.rng, 100.0);
            let hover_phase = state.rng.random::<f32>() * TAU;
            (
                Rect::new(x, y, 40.0, 40.0),
                ObstacleKind::Drone {
                    spin: 0.05,
                    hover_phase,
                },
            )
        }
    };

    let id = state.next_entity_id();
    let score_value = config.combat.obstacle_scores.for_type(kind);
    let mut obstacle = Obstacle::new(id, rect, obstacle_kind, score_value);
    if obstacle.rotation.is_some() {
        obstacle.rotation = Some(state.rng.random::<f32>() * TAU);
    }
    log::debug!("Spawned {} #{} at y={:.0}", kind.as_str(), id, rect.pos.y);
    state.obstacles.push(obstacle);
}

/// Place a powerup at the right edge at a random height
pub fn spawn_powerup(state: &mut GameState, config: &GameConfig, kind: PowerupKind) {
    let physics = &config.physics;
    let y = state.rng.random::<f32>() * (physics.playfield_height - 100.0).max(0.0);
    let id = state.next_entity_id();
    state.powerups.push(Powerup::new(
        id,
        Rect {
            pos: Vec2::new(physics.playfield_width, y),
            size: Vec2::splat(40.0),
        },
        kind,
    ));
}
