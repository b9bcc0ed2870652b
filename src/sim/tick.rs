//! Per-frame simulation tick
//!
//! Order within a tick: scheduled one-shots, secondary action, physics,
//! spawning, movement, collisions, scoring, progression, narrative, ending,
//! then a single compaction pass.

use glam::Vec2;

use super::collision::resolve_collisions;
use super::ending::{on_transition_elapsed, update_ending};
use super::narrative::update_narrative;
use super::physics::integrate_player;
use super::progression::update_progression;
use super::schedule::ScheduledEvent;
use super::scoring::update_scoring;
use super::spawner::spawn_entities;
use super::state::{EmpBurst, Entity, GameEvent, GameState, ObstacleKind, ParticleKind, RunPhase};
use crate::audio::AudioCue;
use crate::config::{GameConfig, SecondaryAction};
use crate::consts::{MAX_FRAME_DT, REFERENCE_FPS};

/// Engine pitch while thrusting / coasting
const PITCH_THRUST: f32 = 0.8;
const PITCH_IDLE: f32 = 0.2;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Thrust held this frame
    pub thrust: bool,
    /// Secondary action pressed (edge-triggered, true for one tick)
    pub secondary: bool,
}

/// Advance the run by `dt` seconds
pub fn tick(state: &mut GameState, config: &GameConfig, input: &TickInput, dt: f32) {
    if !state.is_running() {
        return;
    }
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };
    let time_scale = dt * REFERENCE_FPS;

    state.time += dt as f64;
    state.time_ticks += 1;

    run_scheduled(state, config);

    if input.secondary {
        secondary_action(state, config);
    }

    // Player physics (the ending steers the craft itself)
    if state.ending.controls_player() {
        state.player.thrusting = false;
    } else if integrate_player(&mut state.player, &config.physics, input.thrust, dt) {
        let at = state.player.rect.pos + Vec2::new(-10.0, 15.0);
        state.emit_particles(ParticleKind::Thrust, at, 1);
    }

    if state.player.update_status(dt, &config.energy) {
        log::debug!("Phase dropped, out of energy");
    }
    update_engine_pitch(state);

    spawn_entities(state, config, dt);

    // Scroll the world
    let normal_speed = if state.player.is_overclocked() {
        config.physics.base_speed * config.powerups.overclock_multiplier
    } else {
        config.physics.base_speed
    };
    let scroll = state.ending.scroll_speed(normal_speed, config);
    move_entities(state, config, scroll, time_scale, dt);

    resolve_collisions(state, config);
    if state.player.integrity <= 0.0 {
        lose(state);
        state.compact();
        return;
    }

    // Distance and the run clock stand still once the ending starts
    let distance_delta = if state.ending.holds_progress() {
        0.0
    } else {
        let delta = scroll * time_scale;
        state.distance += delta;
        state.time_left = (state.time_left - dt).max(0.0);
        delta
    };

    update_scoring(state, &config.combat, distance_delta, dt);
    update_progression(state, config);
    update_narrative(state, config);
    update_ending(state, config, dt);

    state.compact();
}

/// Fire every deferred one-shot that has come due
fn run_scheduled(state: &mut GameState, config: &GameConfig) {
    for event in state.schedule.drain_due(state.time) {
        match event {
            ScheduledEvent::ExpireDialogue { id } => {
                if state.active_dialogue.as_ref().is_some_and(|d| d.id == id) {
                    state.active_dialogue = None;
                }
            }
            ScheduledEvent::ExpireLog { serial } => {
                if state.active_log.as_ref().is_some_and(|l| l.serial == serial) {
                    state.active_log = None;
                }
            }
            ScheduledEvent::EndTransition => on_transition_elapsed(state, config),
        }
    }
}

fn secondary_action(state: &mut GameState, config: &GameConfig) {
    let energy = &config.energy;
    match config.secondary {
        SecondaryAction::Emp => {
            if state.player.spend_energy(energy.emp_cost) {
                let at = state.player.rect.center();
                let id = state.next_entity_id();
                state.emps.push(EmpBurst::new(id, at, energy.emp_radius));
                state.emit_particles(ParticleKind::Glitch, at, 20);
                state.cue(AudioCue::Emp);
            } else {
                state.cue(AudioCue::LowEnergy);
            }
        }
        SecondaryAction::Phase => {
            let player = &mut state.player;
            if player.phasing {
                player.phasing = false;
            } else if player.energy > 0.0 {
                player.phasing = true;
            } else {
                state.cue(AudioCue::LowEnergy);
            }
        }
    }
}

fn update_engine_pitch(state: &mut GameState) {
    let pitch = if state.player.thrusting {
        PITCH_THRUST
    } else {
        PITCH_IDLE
    };
    if pitch != state.engine_pitch {
        state.engine_pitch = pitch;
        state.cue(AudioCue::EnginePitch(pitch));
    }
}

fn move_entities(
    state: &mut GameState,
    config: &GameConfig,
    scroll: f32,
    time_scale: f32,
    dt: f32,
) {
    let cull_x = config.spawn.cull_x;
    let obstacle_speed = config.level(state.level_index).obstacle_speed;

    for obstacle in &mut state.obstacles {
        obstacle.rect.pos.x -= scroll * obstacle_speed * time_scale;
        if let (Some(rotation), Some(spin)) = (obstacle.rotation.as_mut(), obstacle.kind.spin()) {
            *rotation += spin * time_scale;
        }
        if let ObstacleKind::Drone { hover_phase, .. } = &mut obstacle.kind {
            *hover_phase += 0.05 * time_scale;
        }
        if obstacle.rect.pos.x < cull_x {
            obstacle.mark_for_deletion();
        }
    }

    for powerup in &mut state.powerups {
        powerup.rect.pos.x -= scroll * time_scale;
        powerup.float_offset += 0.05 * time_scale;
        if powerup.rect.pos.x < cull_x {
            powerup.mark_for_deletion();
        }
    }

    for data_log in &mut state.data_logs {
        data_log.rect.pos.x -= scroll * time_scale;
        data_log.float_offset += 0.03 * time_scale;
        if data_log.rect.pos.x < cull_x {
            data_log.mark_for_deletion();
        }
    }

    // The ending landmark stays in the world until the run is over
    for landmark in &mut state.landmarks {
        landmark.rect.pos.x -= scroll * time_scale;
        if landmark.rect.right() < cull_x && landmark.kind != config.ending.landmark {
            landmark.mark_for_deletion();
        }
    }

    for emp in &mut state.emps {
        emp.expand(config.energy.emp_growth * time_scale);
    }

    for particle in &mut state.particles {
        particle.update(dt);
    }

    for popup in &mut state.popups {
        popup.update(dt);
    }
}

fn lose(state: &mut GameState) {
    log::info!(
        "Run lost at {:.1}% with score {:.0}",
        state.progress * 100.0,
        state.score
    );
    state.phase = RunPhase::Lost;
    state.push_event(GameEvent::Lost);
    state.cue(AudioCue::StopMusic);
}
