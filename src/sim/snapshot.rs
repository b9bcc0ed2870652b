//! Throttled HUD snapshot, the only contract with presentation

use serde::{Deserialize, Serialize};

use super::state::{ActiveDialogue, GameState};
use crate::config::GameConfig;

/// Everything the HUD shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub integrity: f32,
    pub energy: f32,
    pub max_energy: f32,
    /// Progress toward victory, in percent
    pub progress: f32,
    pub time_left: f32,
    pub level_index: usize,
    pub level_name: String,
    pub score: f64,
    pub combo: u32,
    pub active_dialogue: Option<ActiveDialogue>,
    pub active_log: Option<String>,
    pub shielded: bool,
    pub phasing: bool,
    pub ending: bool,
}

impl HudSnapshot {
    pub fn capture(state: &GameState, config: &GameConfig) -> Self {
        let player = &state.player;
        Self {
            integrity: player.integrity,
            energy: player.energy,
            max_energy: player.max_energy,
            progress: state.progress * 100.0,
            time_left: state.time_left,
            level_index: state.level_index,
            level_name: config.level(state.level_index).name.clone(),
            score: state.score,
            combo: player.combo,
            active_dialogue: state.active_dialogue.clone(),
            active_log: state.active_log.as_ref().map(|l| l.message.clone()),
            shielded: player.is_shielded(),
            phasing: player.phasing,
            ending: state.ending.is_active(),
        }
    }
}

/// Lets a snapshot through at most `hz` times per second
#[derive(Debug, Clone)]
pub struct SnapshotThrottle {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl SnapshotThrottle {
    pub fn new(hz: f32) -> Self {
        let interval_ms = if hz > 0.0 { 1000.0 / hz as f64 } else { 0.0 };
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// True if a snapshot is due at `now_ms`; records the emission
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms && now_ms >= last => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    /// Next call to [`Self::ready`] emits
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_at_ten_hz() {
        let mut throttle = SnapshotThrottle::new(10.0);
        // One second of 20 ms frames
        let emitted = (0..50)
            .map(|frame| frame as f64 * 20.0)
            .filter(|&now| throttle.ready(now))
            .count();
        assert_eq!(emitted, 10);
    }

    #[test]
    fn test_clock_going_backwards_emits() {
        let mut throttle = SnapshotThrottle::new(10.0);
        assert!(throttle.ready(5_000.0));
        assert!(!throttle.ready(5_010.0));
        assert!(throttle.ready(100.0));
    }

    #[test]
    fn test_capture_reads_state() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 1);
        state.progress = 0.5;
        state.player.phasing = true;
        let snapshot = HudSnapshot::capture(&state, &config);
        assert_eq!(snapshot.progress, 50.0);
        assert!(snapshot.phasing);
        assert_eq!(snapshot.integrity, 100.0);
        assert_eq!(snapshot.level_name, config.levels[0].name);
    }
}
