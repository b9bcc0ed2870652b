//! Frame-driven loop driver
//!
//! A [`Session`] owns the config, the current run and its collaborators. The
//! host calls [`Session::frame`] once per display refresh and gets back the
//! drained events, an optional throttled snapshot and the run outcome.

use serde::{Deserialize, Serialize};

use crate::audio::{AudioCue, AudioManager, AudioSink};
use crate::config::GameConfig;
use crate::error::ConfigResult;
use crate::sim::{
    FrameClock, GameEvent, GameState, HudSnapshot, RunPhase, SnapshotThrottle, TickInput,
    autopilot, tick,
};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Won,
    Lost,
}

/// Result of one driven frame
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// Run this frame belongs to; bumps on every new run
    pub generation: u64,
    pub dt: f32,
    pub snapshot: Option<HudSnapshot>,
    pub events: Vec<GameEvent>,
    pub outcome: Option<RunOutcome>,
}

/// Game session holding the active run
pub struct Session<S: AudioSink> {
    config: GameConfig,
    state: GameState,
    clock: FrameClock,
    throttle: SnapshotThrottle,
    audio: AudioManager<S>,
    input: TickInput,
    autopilot: bool,
    generation: u64,
    running: bool,
    suspended: bool,
}

impl<S: AudioSink> Session<S> {
    /// Validate `config` and set up an idle session
    pub fn new(config: GameConfig, sink: S) -> ConfigResult<Self> {
        config.validate()?;
        let audio = AudioManager::new(sink, &config.audio);
        Ok(Self {
            state: GameState::new(&config, 0),
            clock: FrameClock::default(),
            throttle: SnapshotThrottle::new(config.snapshot_hz),
            audio,
            input: TickInput::default(),
            autopilot: false,
            generation: 0,
            running: false,
            suspended: false,
            config,
        })
    }

    /// Reset everything and begin a new run. Returns its generation.
    pub fn start_run(&mut self, seed: u64, now_ms: f64) -> u64 {
        self.generation += 1;
        self.state.reset(&self.config, seed);
        self.clock.reset(now_ms);
        self.throttle.reset();
        self.input = TickInput::default();
        self.running = true;
        self.suspended = false;
        log::info!(
            "Run {} started ({:?}, seed {})",
            self.generation,
            self.config.mode,
            seed
        );
        self.generation
    }

    /// Stop the loop; pending one-shots are dropped with it
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.state.schedule.clear();
        self.audio.play(&AudioCue::StopMusic);
        log::info!("Run {} stopped", self.generation);
    }

    /// Backgrounded: frames are ignored until [`Session::resume`]
    pub fn suspend(&mut self) {
        self.suspended = true;
        self.clock.clear();
    }

    /// Resume with a fresh clock anchor so the next tick is ordinary-sized
    pub fn resume(&mut self, now_ms: f64) {
        self.suspended = false;
        self.clock.reset(now_ms);
    }

    pub fn set_thrust(&mut self, held: bool) {
        self.input.thrust = held;
    }

    /// Latch the secondary action for the next frame only
    pub fn press_secondary(&mut self) {
        self.input.secondary = true;
    }

    /// Let the demo pilot fly instead of the latched input
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.suspended
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn audio(&self) -> &AudioManager<S> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager<S> {
        &mut self.audio
    }

    /// Drive one display refresh. `None` when stopped or suspended.
    pub fn frame(&mut self, now_ms: f64) -> Option<FrameReport> {
        if !self.is_running() {
            return None;
        }

        let dt = self.clock.advance(now_ms);
        let input = if self.autopilot {
            autopilot(&self.state, &self.config)
        } else {
            self.input
        };
        // One-shot inputs are consumed by a single tick
        self.input.secondary = false;

        tick(&mut self.state, &self.config, &input, dt);

        let events = self.state.drain_events();
        for event in &events {
            if let GameEvent::Audio(cue) = event {
                self.audio.play(cue);
            }
        }

        let outcome = match self.state.phase {
            RunPhase::Playing => None,
            RunPhase::Won => Some(RunOutcome::Won),
            RunPhase::Lost => Some(RunOutcome::Lost),
        };
        if let Some(outcome) = outcome {
            self.running = false;
            self.state.schedule.clear();
            log::info!(
                "Run {} over: {:?}, score {:.0}, distance {:.0}",
                self.generation,
                outcome,
                self.state.score,
                self.state.distance
            );
        }

        let snapshot = (self.throttle.ready(now_ms) || outcome.is_some())
            .then(|| HudSnapshot::capture(&self.state, &self.config));

        Some(FrameReport {
            generation: self.generation,
            dt,
            snapshot,
            events,
            outcome,
        })
    }
}
