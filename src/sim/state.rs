//! Game state and core simulation types
//!
//! Everything a run mutates lives in [`GameState`]; the loop driver owns it and
//! passes it by reference into each component. Resetting a run replaces it
//! wholesale, which also drops any pending scheduled callbacks.

use std::collections::HashSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ending::EndingState;
use super::narrative::NarrativeScript;
use super::schedule::Schedule;
use crate::audio::AudioCue;
use crate::config::{EnergyConfig, GameConfig, ObstacleType};
use crate::consts::{MAX_INTEGRITY, REFERENCE_FPS};

/// Whether the run is still live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Playing,
    /// Ending sequence finished
    Won,
    /// Hull integrity reached zero
    Lost,
}

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Rectangle of the given size centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

/// Shared contract of every world entity: identity, bounds, deletion flag.
pub trait Entity {
    fn id(&self) -> u32;
    fn rect(&self) -> &Rect;
    fn is_marked(&self) -> bool;
    fn mark_for_deletion(&mut self);
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Entity for $ty {
                fn id(&self) -> u32 {
                    self.id
                }
                fn rect(&self) -> &Rect {
                    &self.rect
                }
                fn is_marked(&self) -> bool {
                    self.marked
                }
                fn mark_for_deletion(&mut self) {
                    self.marked = true;
                }
            }
        )*
    };
}

impl_entity!(Obstacle, Powerup, DataLog, Landmark, Particle, ScorePopup, EmpBurst);

/// Drop everything marked this tick (single pass, order preserved)
pub fn sweep<T: Entity>(items: &mut Vec<T>) {
    items.retain(|e| !e.is_marked());
}

/// Obstacle variants, each carrying only the fields it uses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Tumbling scrap
    Debris { spin: f32 },
    /// Hovering sentry
    Drone { spin: f32, hover_phase: f32 },
    /// Ground-anchored tower
    ServerTower,
    /// Tall floating barrier
    EnergyBarrier,
}

impl ObstacleKind {
    pub fn obstacle_type(&self) -> ObstacleType {
        match self {
            ObstacleKind::Debris { .. } => ObstacleType::Debris,
            ObstacleKind::Drone { .. } => ObstacleType::Drone,
            ObstacleKind::ServerTower => ObstacleType::ServerTower,
            ObstacleKind::EnergyBarrier => ObstacleType::EnergyBarrier,
        }
    }

    /// Radians per reference frame, if this kind rotates
    pub fn spin(&self) -> Option<f32> {
        match *self {
            ObstacleKind::Debris { spin } | ObstacleKind::Drone { spin, .. } => Some(spin),
            ObstacleKind::ServerTower | ObstacleKind::EnergyBarrier => None,
        }
    }
}

/// A hazard scrolling toward the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub rect: Rect,
    pub kind: ObstacleKind,
    pub rotation: Option<f32>,
    pub score_value: u32,
    /// One-way: once disabled (scanned or EMP'd) the obstacle is inert
    disabled: bool,
    marked: bool,
}

impl Obstacle {
    pub fn new(id: u32, rect: Rect, kind: ObstacleKind, score_value: u32) -> Self {
        Self {
            id,
            rect,
            kind,
            rotation: kind.spin().map(|_| 0.0),
            score_value,
            disabled: false,
            marked: false,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Flip the disabled flag. Returns true only on the first call.
    pub fn disable(&mut self) -> bool {
        if self.disabled {
            return false;
        }
        self.disabled = true;
        true
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Energy to max
    Charge,
    /// Hull repair
    Repair,
    /// Timed invulnerability
    Shield,
    /// Timed scroll boost
    Overclock,
    /// Long invulnerability plus a score bonus
    GodMode,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 5] = [
        PowerupKind::Charge,
        PowerupKind::Repair,
        PowerupKind::Shield,
        PowerupKind::Overclock,
        PowerupKind::GodMode,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PowerupKind::Charge => "CHARGE",
            PowerupKind::Repair => "REPAIR",
            PowerupKind::Shield => "SHIELD",
            PowerupKind::Overclock => "OVERCLOCK",
            PowerupKind::GodMode => "GOD MODE",
        }
    }
}

/// A pickup entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub id: u32,
    pub rect: Rect,
    pub kind: PowerupKind,
    /// Bobbing phase (cosmetic)
    pub float_offset: f32,
    marked: bool,
}

impl Powerup {
    pub fn new(id: u32, rect: Rect, kind: PowerupKind) -> Self {
        Self {
            id,
            rect,
            kind,
            float_offset: 0.0,
            marked: false,
        }
    }
}

/// Collectible data log carrying a message for the active-log slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataLog {
    pub id: u32,
    pub rect: Rect,
    pub message: String,
    pub float_offset: f32,
    /// Narrative lore rather than a random log
    pub core_memory: bool,
    marked: bool,
}

impl DataLog {
    pub fn new(id: u32, rect: Rect, message: String, core_memory: bool) -> Self {
        Self {
            id,
            rect,
            message,
            float_offset: 0.0,
            core_memory,
            marked: false,
        }
    }
}

/// Large scenery piece spawned by the narrative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landmark {
    pub id: u32,
    pub rect: Rect,
    pub kind: String,
    pub name: String,
    marked: bool,
}

impl Landmark {
    pub fn new(id: u32, rect: Rect, kind: String, name: String) -> Self {
        Self {
            id,
            rect,
            kind,
            name,
            marked: false,
        }
    }
}

/// Particle behaviours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Engine exhaust
    Thrust,
    /// Falls under gravity with drag
    Spark,
    /// Rises, grows and fades
    Smoke,
    /// Static flicker
    Glitch,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub rect: Rect,
    pub kind: ParticleKind,
    pub vel: Vec2,
    pub radius: f32,
    pub alpha: f32,
    /// Seconds left
    pub life: f32,
    marked: bool,
}

/// Floating score/feedback text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePopup {
    pub id: u32,
    pub rect: Rect,
    pub text: String,
    pub life: f32,
    marked: bool,
}

/// Expanding EMP pulse that disables obstacles it reaches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmpBurst {
    pub id: u32,
    pub rect: Rect,
    pub radius: f32,
    pub max_radius: f32,
    marked: bool,
}

impl EmpBurst {
    pub fn new(id: u32, center: Vec2, max_radius: f32) -> Self {
        let radius = 10.0;
        Self {
            id,
            rect: Rect::centered(center, Vec2::splat(radius * 2.0)),
            radius,
            max_radius,
            marked: false,
        }
    }

    /// Grow the pulse, keeping it centred
    pub fn expand(&mut self, amount: f32) {
        let center = self.rect.center();
        self.radius += amount;
        self.rect = Rect::centered(center, Vec2::splat(self.radius * 2.0));
        if self.radius > self.max_radius {
            self.marked = true;
        }
    }
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    /// Vertical velocity (per reference frame, positive is down)
    pub vy: f32,
    /// Tilt in radians
    pub angle: f32,
    /// Hull integrity (0..=100)
    pub integrity: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub shield_timer: f32,
    pub overclock_timer: f32,
    /// Post-hit grace window
    pub invincible_timer: f32,
    pub phasing: bool,
    /// Invulnerability granted for the scripted ending
    pub ending_shield: bool,
    pub combo: u32,
    pub combo_timer: f32,
    pub thrusting: bool,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        let physics = &config.physics;
        Self {
            rect: Rect::new(
                physics.player_x,
                physics.player_start_y.clamp(0.0, config.max_player_y()),
                physics.player_width,
                physics.player_height,
            ),
            vy: 0.0,
            angle: 0.0,
            integrity: MAX_INTEGRITY,
            energy: config.energy.max_energy,
            max_energy: config.energy.max_energy,
            shield_timer: 0.0,
            overclock_timer: 0.0,
            invincible_timer: 0.0,
            phasing: false,
            ending_shield: false,
            combo: 1,
            combo_timer: 0.0,
            thrusting: false,
        }
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.rect.pos.y
    }

    pub fn is_shielded(&self) -> bool {
        self.shield_timer > 0.0 || self.ending_shield
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0.0
    }

    pub fn is_overclocked(&self) -> bool {
        self.overclock_timer > 0.0
    }

    /// Contact with a live obstacle scans it instead of hurting
    pub fn can_scan(&self) -> bool {
        self.phasing || self.is_shielded()
    }

    /// Subtract integrity, clamped at zero. Returns what is left.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        self.integrity = (self.integrity - amount).clamp(0.0, MAX_INTEGRITY);
        self.integrity
    }

    pub fn repair(&mut self, amount: f32) {
        self.integrity = (self.integrity + amount).clamp(0.0, MAX_INTEGRITY);
    }

    pub fn add_energy(&mut self, amount: f32) {
        self.energy = (self.energy + amount).clamp(0.0, self.max_energy);
    }

    /// Spend energy if there is enough of it
    pub fn spend_energy(&mut self, amount: f32) -> bool {
        if self.energy < amount {
            return false;
        }
        self.energy = (self.energy - amount).clamp(0.0, self.max_energy);
        true
    }

    /// Count down timers and run the energy economy.
    ///
    /// Returns true when phasing switched itself off for lack of energy.
    pub fn update_status(&mut self, dt: f32, energy: &EnergyConfig) -> bool {
        let time_scale = dt * REFERENCE_FPS;
        self.shield_timer = (self.shield_timer - dt).max(0.0);
        self.overclock_timer = (self.overclock_timer - dt).max(0.0);
        self.invincible_timer = (self.invincible_timer - dt).max(0.0);

        if self.phasing {
            self.add_energy(-energy.phase_drain * time_scale);
            if self.energy <= 0.0 {
                self.phasing = false;
                return true;
            }
            false
        } else {
            self.add_energy(energy.recharge_rate * time_scale);
            false
        }
    }
}

/// One-shot keys that have already fired this run
#[derive(Debug, Clone, Default)]
pub struct TriggeredEvents(HashSet<String>);

impl TriggeredEvents {
    /// Record a key. Returns false if it had already fired.
    pub fn insert_once(&mut self, key: &str) -> bool {
        if self.0.contains(key) {
            return false;
        }
        self.0.insert(key.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Dialogue line currently on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveDialogue {
    pub id: String,
    pub speaker: String,
    pub text: String,
}

/// Data log message currently on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveLog {
    /// Distinguishes repeated messages so an old expiry can't clear a new one
    pub serial: u64,
    pub message: String,
}

/// Something the outside world should hear about, drained by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Forward to the audio collaborator
    Audio(AudioCue),
    LevelChanged { from: usize, to: usize },
    DialogueStarted { id: String },
    LogOpened { message: String },
    EndingStarted,
    /// Presentation should white-flash the screen
    Flash,
    CinematicStarted,
    Won,
    Lost,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Simulation clock (seconds since run start)
    pub time: f64,
    pub time_ticks: u64,
    pub phase: RunPhase,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub powerups: Vec<Powerup>,
    pub data_logs: Vec<DataLog>,
    pub landmarks: Vec<Landmark>,
    pub particles: Vec<Particle>,
    pub popups: Vec<ScorePopup>,
    pub emps: Vec<EmpBurst>,
    /// Cumulative scroll distance
    pub distance: f32,
    /// Distance-to-victory ratio, refreshed each tick
    pub progress: f32,
    pub time_left: f32,
    pub score: f64,
    pub level_index: usize,
    pub ending: EndingState,
    pub script: NarrativeScript,
    pub triggered: TriggeredEvents,
    pub active_dialogue: Option<ActiveDialogue>,
    pub active_log: Option<ActiveLog>,
    pub schedule: Schedule,
    /// Pending events for the driver
    pub events: Vec<GameEvent>,
    /// Last engine pitch sent to audio
    pub engine_pitch: f32,
    max_particles: usize,
    next_id: u32,
    next_log_serial: u64,
}

impl GameState {
    /// Create a fresh run
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            time_ticks: 0,
            phase: RunPhase::Playing,
            player: Player::new(config),
            obstacles: Vec::new(),
            powerups: Vec::new(),
            data_logs: Vec::new(),
            landmarks: Vec::new(),
            particles: Vec::new(),
            popups: Vec::new(),
            emps: Vec::new(),
            distance: 0.0,
            progress: 0.0,
            time_left: config.total_time_secs,
            score: 0.0,
            level_index: 0,
            ending: EndingState::default(),
            script: NarrativeScript::from_config(config),
            triggered: TriggeredEvents::default(),
            active_dialogue: None,
            active_log: None,
            schedule: Schedule::default(),
            events: Vec::new(),
            engine_pitch: 0.0,
            max_particles: config.max_particles,
            next_id: 1,
            next_log_serial: 1,
        }
    }

    /// Reset every piece of run state at once
    pub fn reset(&mut self, config: &GameConfig, seed: u64) {
        *self = Self::new(config, seed);
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Playing
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn next_log_serial(&mut self) -> u64 {
        let serial = self.next_log_serial;
        self.next_log_serial += 1;
        serial
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn cue(&mut self, cue: AudioCue) {
        self.events.push(GameEvent::Audio(cue));
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Feedback text rising from `at`
    pub fn spawn_popup(&mut self, text: impl Into<String>, at: Vec2) {
        let id = self.next_entity_id();
        self.popups.push(ScorePopup {
            id,
            rect: Rect::centered(at, Vec2::new(60.0, 20.0)),
            text: text.into(),
            life: 1.0,
            marked: false,
        });
    }

    /// Emit up to `count` particles at `at`, respecting the particle cap
    pub fn emit_particles(&mut self, kind: ParticleKind, at: Vec2, count: usize) {
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                return;
            }
            let (vel, radius, life) = match kind {
                ParticleKind::Thrust => (
                    Vec2::new(
                        -self.rng.random::<f32>() * 4.0 - 2.0,
                        self.rng.random::<f32>() - 0.5,
                    ),
                    self.rng.random::<f32>() * 3.0 + 1.0,
                    0.4,
                ),
                _ => (
                    Vec2::new(
                        (self.rng.random::<f32>() - 0.5) * 8.0,
                        (self.rng.random::<f32>() - 0.5) * 8.0,
                    ),
                    self.rng.random::<f32>() * 3.0 + 1.0,
                    1.0,
                ),
            };
            let id = self.next_entity_id();
            self.particles.push(Particle {
                id,
                rect: Rect::centered(at, Vec2::splat(radius * 2.0)),
                kind,
                vel,
                radius,
                alpha: 1.0,
                life,
                marked: false,
            });
        }
    }

    /// Remove every entity marked for deletion
    pub fn compact(&mut self) {
        sweep(&mut self.obstacles);
        sweep(&mut self.powerups);
        sweep(&mut self.data_logs);
        sweep(&mut self.landmarks);
        sweep(&mut self.particles);
        sweep(&mut self.popups);
        sweep(&mut self.emps);
    }
}

impl Particle {
    /// Advance one tick of particle motion
    pub fn update(&mut self, dt: f32) {
        let time_scale = dt * REFERENCE_FPS;
        self.life -= dt;
        self.rect.pos += self.vel * time_scale;
        match self.kind {
            ParticleKind::Spark => {
                self.vel.y += 0.5 * time_scale;
                self.vel.x *= 0.95;
            }
            ParticleKind::Smoke => {
                self.vel.y -= 0.1 * time_scale;
                self.radius += 0.2 * time_scale;
                self.alpha = (self.alpha - 0.02 * time_scale).max(0.0);
            }
            ParticleKind::Thrust => {
                self.radius *= 0.9;
            }
            ParticleKind::Glitch => {}
        }
        if self.life <= 0.0 {
            self.marked = true;
        }
    }
}

impl ScorePopup {
    pub fn update(&mut self, dt: f32) {
        self.life -= dt;
        self.rect.pos.y -= dt * REFERENCE_FPS;
        if self.life <= 0.0 {
            self.marked = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disable_is_one_way() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut obstacle = Obstacle::new(1, rect, ObstacleKind::ServerTower, 100);
        assert!(!obstacle.is_disabled());
        assert!(obstacle.disable());
        assert!(!obstacle.disable());
        assert!(obstacle.is_disabled());
    }

    #[test]
    fn test_player_clamps_integrity_and_energy() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        player.apply_damage(250.0);
        assert_eq!(player.integrity, 0.0);
        player.repair(500.0);
        assert_eq!(player.integrity, MAX_INTEGRITY);

        player.add_energy(1000.0);
        assert_eq!(player.energy, player.max_energy);
        assert!(!player.spend_energy(player.max_energy + 1.0));
        assert!(player.spend_energy(20.0));
        assert_eq!(player.energy, player.max_energy - 20.0);
    }

    #[test]
    fn test_phasing_drains_until_exhausted() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        player.energy = 1.0;
        player.phasing = true;
        let ended = player.update_status(0.1, &config.energy);
        assert!(ended);
        assert!(!player.phasing);
        assert_eq!(player.energy, 0.0);
    }

    #[test]
    fn test_triggered_events_fire_once() {
        let mut triggered = TriggeredEvents::default();
        assert!(triggered.insert_once("act1_start"));
        assert!(!triggered.insert_once("act1_start"));
        assert_eq!(triggered.len(), 1);
    }

    #[test]
    fn test_compact_removes_only_marked() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 7);
        state.spawn_popup("+100", Vec2::ZERO);
        state.spawn_popup("+200", Vec2::ZERO);
        state.popups[0].mark_for_deletion();
        state.compact();
        assert_eq!(state.popups.len(), 1);
        assert_eq!(state.popups[0].text, "+200");
    }

    #[test]
    fn test_particle_cap() {
        let config = GameConfig {
            max_particles: 4,
            ..Default::default()
        };
        let mut state = GameState::new(&config, 1);
        state.emit_particles(ParticleKind::Spark, Vec2::ZERO, 10);
        assert_eq!(state.particles.len(), 4);
    }
}
