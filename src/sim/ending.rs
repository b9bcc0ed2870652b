//! Scripted ending sequence
//!
//! `Normal -> Approach -> Transition -> Cinematic -> Done`. Every step fires
//! once: entry effects are guarded by flags on [`EndingState`] so
//! re-evaluating a condition on later ticks is a no-op.

use super::schedule::ScheduledEvent;
use super::state::{GameEvent, GameState, RunPhase};
use crate::audio::AudioCue;
use crate::config::GameConfig;
use crate::consts::REFERENCE_FPS;
use crate::damp_toward;

/// Seconds in `Approach` without the ending landmark before warning once
const STALL_WARN_SECS: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EndingPhase {
    #[default]
    Normal,
    /// Slowed scroll, waiting for the ending landmark
    Approach { elapsed: f32 },
    /// Flash fired, waiting for the scheduled hand-off
    Transition,
    Cinematic { remaining: f32 },
    Done,
}

#[derive(Debug, Clone, Default)]
pub struct EndingState {
    pub phase: EndingPhase,
    music_started: bool,
    flash_fired: bool,
    stall_warned: bool,
}

impl EndingState {
    /// Anything past normal play
    pub fn is_active(&self) -> bool {
        self.phase != EndingPhase::Normal
    }

    /// Distance, distance score and the run timer stand still
    pub fn holds_progress(&self) -> bool {
        self.is_active()
    }

    /// World scroll per reference frame for this phase
    pub fn scroll_speed(&self, normal_speed: f32, config: &GameConfig) -> f32 {
        match self.phase {
            EndingPhase::Normal => normal_speed,
            EndingPhase::Approach { .. } | EndingPhase::Transition => {
                normal_speed * config.ending.speed_factor
            }
            EndingPhase::Cinematic { .. } => config.ending.cinematic_speed,
            EndingPhase::Done => 0.0,
        }
    }

    /// Player steering is taken over by the sequence
    pub fn controls_player(&self) -> bool {
        self.is_active()
    }
}

/// Advance the ending machine one tick
pub fn update_ending(state: &mut GameState, config: &GameConfig, dt: f32) {
    match state.ending.phase {
        EndingPhase::Normal => {
            if config.is_story() && state.progress >= config.ending.threshold {
                begin_approach(state);
            }
        }
        EndingPhase::Approach { elapsed } => {
            let elapsed = elapsed + dt;
            state.ending.phase = EndingPhase::Approach { elapsed };
            ease_to_anchor(state, config, dt);

            let ending = &config.ending;
            let landmark_x = state
                .landmarks
                .iter()
                .find(|l| l.kind == ending.landmark)
                .map(|l| l.rect.pos.x);

            match landmark_x {
                Some(x) if elapsed >= ending.min_approach_secs && x < ending.trigger_x => {
                    begin_transition(state, config);
                }
                None if elapsed >= STALL_WARN_SECS && !state.ending.stall_warned => {
                    state.ending.stall_warned = true;
                    log::warn!(
                        "Ending approach has waited {:.0}s with no '{}' landmark in the world",
                        elapsed,
                        ending.landmark
                    );
                }
                _ => {}
            }
        }
        EndingPhase::Transition => {
            ease_to_anchor(state, config, dt);
        }
        EndingPhase::Cinematic { remaining } => {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                finish(state);
            } else {
                state.ending.phase = EndingPhase::Cinematic { remaining };
            }
        }
        EndingPhase::Done => {}
    }
}

/// Scheduled hand-off from the flash into the cinematic
pub fn on_transition_elapsed(state: &mut GameState, config: &GameConfig) {
    if state.ending.phase != EndingPhase::Transition {
        return;
    }
    log::info!("Ending cinematic ({:.0}s)", config.ending.cinematic_secs);
    state.ending.phase = EndingPhase::Cinematic {
        remaining: config.ending.cinematic_secs,
    };
    state.push_event(GameEvent::CinematicStarted);
}

fn begin_approach(state: &mut GameState) {
    log::info!("Ending approach at {:.1}%", state.progress * 100.0);
    state.ending.phase = EndingPhase::Approach { elapsed: 0.0 };
    state.player.ending_shield = true;
    if !state.ending.music_started {
        state.ending.music_started = true;
        state.cue(AudioCue::EndingMusicStart);
    }
    state.push_event(GameEvent::EndingStarted);
}

fn begin_transition(state: &mut GameState, config: &GameConfig) {
    state.ending.phase = EndingPhase::Transition;
    if state.ending.flash_fired {
        return;
    }
    state.ending.flash_fired = true;
    log::info!("Ending landmark reached, flash");
    state.push_event(GameEvent::Flash);
    state.schedule.push(
        state.time + config.ending.transition_delay_secs as f64,
        ScheduledEvent::EndTransition,
    );
}

fn finish(state: &mut GameState) {
    log::info!("Run won, score {:.0}", state.score);
    state.ending.phase = EndingPhase::Done;
    state.phase = RunPhase::Won;
    state.push_event(GameEvent::Won);
    state.cue(AudioCue::EndingMusicStop);
}

/// Glide the craft toward the anchor height, holding it level
fn ease_to_anchor(state: &mut GameState, config: &GameConfig, dt: f32) {
    let max_y = config.max_player_y();
    let target = config.ending.anchor_y.clamp(0.0, max_y);
    let player = &mut state.player;
    let y = damp_toward(
        player.rect.pos.y,
        target,
        config.ending.anchor_rate,
        dt * REFERENCE_FPS,
    );
    player.rect.pos.y = y.clamp(0.0, max_y);
    player.vy = 0.0;
    player.angle = damp_toward(player.angle, 0.0, config.physics.tilt_damping, dt * REFERENCE_FPS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Landmark, Rect};

    fn at_threshold() -> (GameState, GameConfig) {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 1);
        state.progress = config.ending.threshold;
        (state, config)
    }

    fn count(events: &[GameEvent], wanted: &GameEvent) -> usize {
        events.iter().filter(|e| *e == wanted).count()
    }

    #[test]
    fn test_approach_starts_exactly_once() {
        let (mut state, config) = at_threshold();
        for _ in 0..10 {
            update_ending(&mut state, &config, 0.1);
        }
        let events = state.drain_events();
        assert_eq!(count(&events, &GameEvent::EndingStarted), 1);
        assert_eq!(count(&events, &GameEvent::Audio(AudioCue::EndingMusicStart)), 1);
        assert!(state.player.ending_shield);
        assert!(matches!(state.ending.phase, EndingPhase::Approach { .. }));
    }

    #[test]
    fn test_below_threshold_stays_normal() {
        let (mut state, config) = at_threshold();
        state.progress = config.ending.threshold - 0.01;
        update_ending(&mut state, &config, 0.1);
        assert_eq!(state.ending.phase, EndingPhase::Normal);
        assert!(!state.player.ending_shield);
    }

    #[test]
    fn test_endless_mode_never_ends() {
        let (mut state, mut config) = at_threshold();
        config.mode = crate::config::GameMode::Endless;
        state.progress = 5.0;
        update_ending(&mut state, &config, 0.1);
        assert_eq!(state.ending.phase, EndingPhase::Normal);
    }

    #[test]
    fn test_approach_eases_toward_anchor() {
        let (mut state, config) = at_threshold();
        state.player.rect.pos.y = 0.0;
        update_ending(&mut state, &config, 0.1);
        for _ in 0..100 {
            update_ending(&mut state, &config, 0.1);
        }
        assert!((state.player.y() - config.ending.anchor_y).abs() < 1.0);
        assert_eq!(state.player.vy, 0.0);
    }

    #[test]
    fn test_waits_for_landmark_then_flashes_once() {
        let (mut state, config) = at_threshold();
        update_ending(&mut state, &config, 0.1);

        // Past the minimum approach time, but no landmark yet
        for _ in 0..60 {
            update_ending(&mut state, &config, 0.1);
        }
        assert!(matches!(state.ending.phase, EndingPhase::Approach { .. }));

        state.landmarks.push(Landmark::new(
            99,
            Rect::new(config.ending.trigger_x - 1.0, 150.0, 300.0, 300.0),
            config.ending.landmark.clone(),
            "ring".into(),
        ));
        for _ in 0..5 {
            update_ending(&mut state, &config, 0.1);
        }
        assert_eq!(state.ending.phase, EndingPhase::Transition);
        assert_eq!(count(&state.drain_events(), &GameEvent::Flash), 1);
        assert_eq!(state.schedule.len(), 1);
    }

    #[test]
    fn test_cinematic_counts_down_to_win() {
        let (mut state, config) = at_threshold();
        state.ending.phase = EndingPhase::Transition;
        on_transition_elapsed(&mut state, &config);
        assert!(matches!(state.ending.phase, EndingPhase::Cinematic { .. }));

        let ticks = (config.ending.cinematic_secs / 0.1).ceil() as usize + 1;
        for _ in 0..ticks {
            update_ending(&mut state, &config, 0.1);
        }
        assert_eq!(state.ending.phase, EndingPhase::Done);
        assert_eq!(state.phase, RunPhase::Won);
        let events = state.drain_events();
        assert_eq!(count(&events, &GameEvent::Won), 1);
        assert_eq!(count(&events, &GameEvent::Audio(AudioCue::EndingMusicStop)), 1);
    }

    #[test]
    fn test_stale_transition_callback_is_ignored() {
        let (mut state, config) = at_threshold();
        on_transition_elapsed(&mut state, &config);
        assert_eq!(state.ending.phase, EndingPhase::Normal);
    }

    #[test]
    fn test_scroll_speed_by_phase() {
        let config = GameConfig::default();
        let mut ending = EndingState::default();
        assert_eq!(ending.scroll_speed(9.0, &config), 9.0);
        ending.phase = EndingPhase::Approach { elapsed: 0.0 };
        assert_eq!(ending.scroll_speed(9.0, &config), 4.5);
        ending.phase = EndingPhase::Cinematic { remaining: 1.0 };
        assert_eq!(ending.scroll_speed(9.0, &config), config.ending.cinematic_speed);
        ending.phase = EndingPhase::Done;
        assert_eq!(ending.scroll_speed(9.0, &config), 0.0);
    }
}
