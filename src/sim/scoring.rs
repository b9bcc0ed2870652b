//! Combo multiplier and score accrual
//!
//! The combo only moves through collision outcomes: rewards bump it (capped)
//! and restart the decay countdown, damage drops it straight to 1. Running out
//! the countdown also drops it to 1, without touching the score.

use super::state::{GameState, Player};
use crate::config::CombatConfig;

/// Bump the combo after a reward and restart the decay countdown
pub fn reward_combo(player: &mut Player, combat: &CombatConfig) {
    player.combo = (player.combo + 1).min(combat.max_combo.max(1));
    player.combo_timer = combat.combo_decay_secs;
}

/// Drop the combo to 1. Returns true if a multiplier was lost.
pub fn break_combo(player: &mut Player) -> bool {
    let broken = player.combo > 1;
    player.combo = 1;
    player.combo_timer = 0.0;
    broken
}

/// Run the decay countdown. Returns true if the combo just expired.
pub fn decay_combo(player: &mut Player, dt: f32) -> bool {
    if player.combo <= 1 {
        player.combo_timer = 0.0;
        return false;
    }
    player.combo_timer -= dt;
    if player.combo_timer <= 0.0 {
        player.combo = 1;
        player.combo_timer = 0.0;
        return true;
    }
    false
}

/// Score the distance travelled this tick, multiplied by the combo
pub fn accrue_distance_score(state: &mut GameState, combat: &CombatConfig, distance_delta: f32) {
    if distance_delta <= 0.0 {
        return;
    }
    state.score += distance_delta as f64 * combat.score_rate as f64 * state.player.combo as f64;
}

/// Add an event reward, multiplied by the combo at the time of the event
pub fn award(state: &mut GameState, base: u32) -> f64 {
    let points = base as f64 * state.player.combo as f64;
    state.score += points;
    points
}

/// Per-tick scoring step: distance score, then combo decay
pub fn update_scoring(state: &mut GameState, combat: &CombatConfig, distance_delta: f32, dt: f32) {
    accrue_distance_score(state, combat, distance_delta);
    if decay_combo(&mut state.player, dt) {
        log::debug!("Combo expired");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn test_combo_caps_at_max() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        for _ in 0..50 {
            reward_combo(&mut player, &config.combat);
        }
        assert_eq!(player.combo, config.combat.max_combo);
    }

    #[test]
    fn test_combo_decays_to_exactly_one_without_penalty() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 1);
        reward_combo(&mut state.player, &config.combat);
        reward_combo(&mut state.player, &config.combat);
        assert_eq!(state.player.combo, 3);
        state.score = 1234.0;

        let steps = (config.combat.combo_decay_secs / 0.1).ceil() as usize + 1;
        for _ in 0..steps {
            update_scoring(&mut state, &config.combat, 0.0, 0.1);
        }
        assert_eq!(state.player.combo, 1);
        assert_eq!(state.score, 1234.0);
    }

    #[test]
    fn test_reward_restarts_countdown() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        reward_combo(&mut player, &config.combat);
        decay_combo(&mut player, config.combat.combo_decay_secs - 0.5);
        reward_combo(&mut player, &config.combat);
        decay_combo(&mut player, 1.0);
        assert_eq!(player.combo, 3);
    }

    #[test]
    fn test_break_reports_lost_multiplier() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        assert!(!break_combo(&mut player));
        reward_combo(&mut player, &config.combat);
        assert!(break_combo(&mut player));
        assert_eq!(player.combo, 1);
    }

    #[test]
    fn test_distance_score_uses_combo() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 1);
        accrue_distance_score(&mut state, &config.combat, 100.0);
        let single = state.score;
        state.score = 0.0;
        state.player.combo = 2;
        accrue_distance_score(&mut state, &config.combat, 100.0);
        assert!((state.score - single * 2.0).abs() < 1e-9);
    }
}
