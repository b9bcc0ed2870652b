//! Vertical hover physics for the player craft
//!
//! Constants are per reference frame; `dt * 60` scales them to the real
//! frame length.

use super::state::Player;
use crate::config::PhysicsConfig;
use crate::consts::REFERENCE_FPS;
use crate::damp_toward;

/// Advance the craft one tick under gravity and optional thrust.
///
/// Returns true when an exhaust particle should be emitted.
pub fn integrate_player(
    player: &mut Player,
    physics: &PhysicsConfig,
    thrust: bool,
    dt: f32,
) -> bool {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    let time_scale = dt * REFERENCE_FPS;

    player.thrusting = thrust;
    if thrust {
        player.vy += physics.thrust_power * time_scale;
    }
    player.vy += physics.gravity * time_scale;
    player.vy = player.vy.min(physics.max_fall_speed);

    let max_y = (physics.playfield_height - physics.player_height).max(0.0);
    let mut y = player.rect.pos.y + player.vy * time_scale;
    if !y.is_finite() {
        y = player.rect.pos.y;
        player.vy = 0.0;
    }
    if y <= 0.0 {
        y = 0.0;
        player.vy = 0.0;
    } else if y >= max_y {
        y = max_y;
        player.vy = 0.0;
    }
    player.rect.pos.y = y;

    let target_angle = player.vy * physics.tilt_factor;
    player.angle = damp_toward(player.angle, target_angle, physics.tilt_damping, time_scale);

    thrust
}
