//! One-shot narrative triggers
//!
//! The script is a flat, ordered list of `(threshold, key, payload)` built from
//! the config tables. A trigger fires the first tick progress reaches its
//! threshold, and its key goes into the run's triggered set so it never fires
//! again.

use glam::Vec2;
use rand::Rng;

use super::schedule::ScheduledEvent;
use super::state::{ActiveDialogue, DataLog, GameEvent, GameState, Landmark, Rect, TriggeredEvents};
use crate::config::GameConfig;

/// What a trigger does when it fires
#[derive(Debug, Clone, PartialEq)]
pub enum NarrativePayload {
    /// Show a line in the auto-expiring dialogue slot
    Dialogue {
        id: String,
        speaker: String,
        text: String,
    },
    /// Push a lore data log into the world
    Lore { message: String },
    /// Push a landmark into the world
    Landmark { kind: String, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeTrigger {
    /// Progress ratio
    pub threshold: f32,
    pub key: String,
    pub payload: NarrativePayload,
}

/// Ordered trigger list for a run
#[derive(Debug, Clone, Default)]
pub struct NarrativeScript {
    triggers: Vec<NarrativeTrigger>,
}

impl NarrativeScript {
    /// Dialogue, then lore fragments, then landmarks, each in table order
    pub fn from_config(config: &GameConfig) -> Self {
        let narrative = &config.narrative;
        let dialogue = narrative.story_moments.iter().map(|m| NarrativeTrigger {
            threshold: m.progress,
            key: m.id.clone(),
            payload: NarrativePayload::Dialogue {
                id: m.id.clone(),
                speaker: m.speaker.clone(),
                text: m.text.clone(),
            },
        });
        let lore = narrative.fragments.iter().map(|f| NarrativeTrigger {
            threshold: f.progress,
            key: format!("frag_{}", f.progress),
            payload: NarrativePayload::Lore {
                message: f.message.clone(),
            },
        });
        let landmarks = narrative.landmarks.iter().map(|l| NarrativeTrigger {
            threshold: l.progress,
            key: l.kind.clone(),
            payload: NarrativePayload::Landmark {
                kind: l.kind.clone(),
                name: l.name.clone(),
            },
        });
        Self {
            triggers: dialogue.chain(lore).chain(landmarks).collect(),
        }
    }

    pub fn triggers(&self) -> &[NarrativeTrigger] {
        &self.triggers
    }

    /// Claim every trigger whose threshold is crossed and whose key is new
    pub fn poll(&self, progress: f32, fired: &mut TriggeredEvents) -> Vec<NarrativePayload> {
        self.triggers
            .iter()
            .filter(|t| progress >= t.threshold)
            .filter(|t| fired.insert_once(&t.key))
            .map(|t| t.payload.clone())
            .collect()
    }
}

/// Fire due narrative triggers (story mode only)
pub fn update_narrative(state: &mut GameState, config: &GameConfig) {
    if !config.is_story() {
        return;
    }
    let due = state.script.poll(state.progress, &mut state.triggered);
    for payload in due {
        apply_payload(state, config, payload);
    }
}

fn apply_payload(state: &mut GameState, config: &GameConfig, payload: NarrativePayload) {
    let physics = &config.physics;
    match payload {
        NarrativePayload::Dialogue { id, speaker, text } => {
            log::info!("Dialogue [{}] {}: {}", id, speaker, text);
            state.schedule.push(
                state.time + config.narrative.dialogue_secs as f64,
                ScheduledEvent::ExpireDialogue { id: id.clone() },
            );
            state.push_event(GameEvent::DialogueStarted { id: id.clone() });
            state.active_dialogue = Some(ActiveDialogue { id, speaker, text });
        }
        NarrativePayload::Lore { message } => {
            let id = state.next_entity_id();
            let y = 100.0 + state.rng.random::<f32>() * 300.0;
            state.data_logs.push(DataLog::new(
                id,
                Rect::new(physics.playfield_width + 100.0, y, 30.0, 20.0),
                message,
                true,
            ));
        }
        NarrativePayload::Landmark { kind, name } => {
            log::info!("Landmark '{}' ({}) entering", name, kind);
            let id = state.next_entity_id();
            let size = Vec2::splat(300.0);
            let center = Vec2::new(
                physics.playfield_width + 100.0 + size.x / 2.0,
                physics.playfield_height / 2.0,
            );
            state
                .landmarks
                .push(Landmark::new(id, Rect::centered(center, size), kind, name));
        }
    }
}
