//! Distance-driven level selection

use super::state::{GameEvent, GameState};
use crate::audio::AudioCue;
use crate::config::{GameConfig, GameMode, LevelConfig};

/// Story runs stop counting a little past the finish line
pub const STORY_PROGRESS_CAP: f32 = 1.02;

/// Fraction of the victory distance covered
pub fn progress_ratio(distance: f32, victory_distance: f32, mode: GameMode) -> f32 {
    if victory_distance.is_nan() || victory_distance <= 0.0 {
        return 0.0;
    }
    let ratio = (distance / victory_distance).max(0.0);
    match mode {
        GameMode::Story => ratio.min(STORY_PROGRESS_CAP),
        GameMode::Endless => ratio,
    }
}

/// Highest level whose threshold (percent) has been reached; 0 if none
pub fn select_level(levels: &[LevelConfig], progress_percent: f32) -> usize {
    levels
        .iter()
        .rposition(|level| progress_percent >= level.threshold)
        .unwrap_or(0)
}

/// Refresh progress and the level index, announcing biome changes once
pub fn update_progression(state: &mut GameState, config: &GameConfig) {
    state.progress = progress_ratio(state.distance, config.victory_distance, config.mode);
    let index = select_level(&config.levels, state.progress * 100.0);

    if index != state.level_index {
        let from = state.level_index;
        state.level_index = index;
        log::info!(
            "Level {} -> {} ({}) at {:.1}%",
            from,
            index,
            config.level(index).name,
            state.progress * 100.0
        );
        state.push_event(GameEvent::LevelChanged { from, to: index });
        state.cue(AudioCue::LevelMusic(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        let config = GameConfig::default();
        assert_eq!(select_level(&config.levels, 0.0), 0);
        assert_eq!(select_level(&config.levels, 24.99), 0);
        assert_eq!(select_level(&config.levels, 25.0), 1);
        assert_eq!(select_level(&config.levels, 74.9), 2);
        assert_eq!(select_level(&config.levels, 75.0), 3);
        assert_eq!(select_level(&config.levels, 96.0), 4);
        assert_eq!(select_level(&config.levels, 150.0), 4);
    }

    #[test]
    fn test_nothing_matches_defaults_to_zero() {
        let mut config = GameConfig::default();
        for level in &mut config.levels {
            level.threshold += 10.0;
        }
        assert_eq!(select_level(&config.levels, 5.0), 0);
        assert_eq!(select_level(&[], 50.0), 0);
    }

    #[test]
    fn test_story_progress_is_capped() {
        assert_eq!(progress_ratio(1_000.0, 100.0, GameMode::Story), STORY_PROGRESS_CAP);
        assert_eq!(progress_ratio(1_000.0, 100.0, GameMode::Endless), 10.0);
        assert_eq!(progress_ratio(10.0, 0.0, GameMode::Story), 0.0);
    }

    #[test]
    fn test_level_change_emits_once() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 1);
        state.distance = config.victory_distance * 0.30;
        update_progression(&mut state, &config);
        update_progression(&mut state, &config);
        let changes: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::LevelChanged { .. }))
            .collect();
        assert_eq!(changes, vec![GameEvent::LevelChanged { from: 0, to: 1 }]);
        assert_eq!(state.level_index, 1);
    }
}
