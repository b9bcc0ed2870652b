//! Demo/idle pilot
//!
//! Produces the same [`TickInput`] a player would, so headless runs and the
//! attract screen exercise the real simulation path.

use super::state::{GameState, Obstacle};
use super::tick::TickInput;
use crate::config::{GameConfig, SecondaryAction};

/// How far ahead of the craft obstacles are considered
const LOOKAHEAD: f32 = 420.0;
/// Vertical clearance to aim for around an obstacle
const CLEARANCE: f32 = 25.0;
/// Frames of velocity to lead the height target by
const LEAD_FRAMES: f32 = 6.0;
/// Distance at which the secondary action is used on a threat
const ACTION_RANGE: f32 = 160.0;

/// Pick inputs for the next tick
pub fn autopilot(state: &GameState, config: &GameConfig) -> TickInput {
    let player = &state.player;
    let physics = &config.physics;
    let max_y = config.max_player_y();

    let threat = nearest_threat(state);

    let target = match threat {
        Some(obstacle) => {
            let above = obstacle.rect.pos.y - physics.player_height - CLEARANCE;
            let below = obstacle.rect.bottom() + CLEARANCE;
            let above_ok = above >= 0.0;
            let below_ok = below <= max_y;
            match (above_ok, below_ok) {
                (true, true) => {
                    if (player.y() - above).abs() <= (player.y() - below).abs() {
                        above
                    } else {
                        below
                    }
                }
                (true, false) => above,
                (false, true) => below,
                // No gap; hold mid-field and rely on the secondary action
                (false, false) => max_y / 2.0,
            }
        }
        None => state
            .powerups
            .iter()
            .filter(|p| p.rect.pos.x > player.rect.right())
            .min_by(|a, b| a.rect.pos.x.total_cmp(&b.rect.pos.x))
            .map(|p| p.rect.center().y - physics.player_height / 2.0)
            .unwrap_or(max_y / 2.0),
    };

    let predicted = player.y() + player.vy * LEAD_FRAMES;
    let thrust = predicted > target.clamp(0.0, max_y);

    let in_range = threat.is_some_and(|o| o.rect.pos.x - player.rect.right() < ACTION_RANGE);
    let secondary = match config.secondary {
        SecondaryAction::Emp => {
            in_range && state.emps.is_empty() && player.energy >= config.energy.emp_cost
        }
        SecondaryAction::Phase => {
            let want = in_range && player.energy > config.energy.emp_cost;
            want != player.phasing
        }
    };

    TickInput { thrust, secondary }
}

/// Closest live obstacle ahead of (or overlapping) the craft
fn nearest_threat(state: &GameState) -> Option<&Obstacle> {
    let player = &state.player.rect;
    state
        .obstacles
        .iter()
        .filter(|o| !o.is_disabled())
        .filter(|o| o.rect.right() > player.pos.x && o.rect.pos.x < player.right() + LOOKAHEAD)
        .min_by(|a, b| a.rect.pos.x.total_cmp(&b.rect.pos.x))
}
