//! Game configuration and content tables
//!
//! Everything here is read-only during a run. `Default` reproduces the shipped
//! balance; a JSON file can override any subset of it (missing keys fall back
//! to the defaults). Call [`GameConfig::validate`] before starting a run.

use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, ConfigResult};

/// Story runs have narrative and a scripted ending; endless runs scroll forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Story,
    Endless,
}

/// What the edge-triggered secondary input does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryAction {
    /// Spend energy on an expanding pulse that disables obstacles
    #[default]
    Emp,
    /// Toggle a pass-through phase that drains energy and scans obstacles
    Phase,
}

/// Obstacle families a level may spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleType {
    Debris,
    Drone,
    ServerTower,
    EnergyBarrier,
}

impl ObstacleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleType::Debris => "debris",
            ObstacleType::Drone => "drone",
            ObstacleType::ServerTower => "server_tower",
            ObstacleType::EnergyBarrier => "energy_barrier",
        }
    }
}

/// A legal obstacle type with its relative spawn weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleWeight {
    pub kind: ObstacleType,
    pub weight: f32,
}

impl ObstacleWeight {
    pub fn new(kind: ObstacleType, weight: f32) -> Self {
        Self { kind, weight }
    }
}

/// One biome band of the run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub name: String,
    pub subtext: String,
    /// Progress percentage at which this level starts
    pub threshold: f32,
    pub obstacle_speed: f32,
    pub spawn_rate: f32,
    /// Legal obstacle types; empty means no obstacles spawn here
    pub obstacles: Vec<ObstacleWeight>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            name: "SECTOR 01".to_string(),
            subtext: "NEON WASTELANDS".to_string(),
            threshold: 0.0,
            obstacle_speed: 1.0,
            spawn_rate: 1.0,
            obstacles: standard_obstacle_mix(),
        }
    }
}

/// Used when the level table has nothing at all for an index
static FALLBACK_LEVEL: LazyLock<LevelConfig> = LazyLock::new(LevelConfig::default);

fn standard_obstacle_mix() -> Vec<ObstacleWeight> {
    vec![
        ObstacleWeight::new(ObstacleType::Debris, 0.30),
        ObstacleWeight::new(ObstacleType::Drone, 0.30),
        ObstacleWeight::new(ObstacleType::EnergyBarrier, 0.25),
        ObstacleWeight::new(ObstacleType::ServerTower, 0.15),
    ]
}

fn default_levels() -> Vec<LevelConfig> {
    let level = |name: &str, subtext: &str, threshold: f32, speed: f32, rate: f32| LevelConfig {
        name: name.to_string(),
        subtext: subtext.to_string(),
        threshold,
        obstacle_speed: speed,
        spawn_rate: rate,
        obstacles: if rate > 0.0 {
            standard_obstacle_mix()
        } else {
            Vec::new()
        },
    };
    vec![
        level("SECTOR 01", "NEON WASTELANDS", 0.0, 1.0, 1.0),
        level("SECTOR 02", "SYNTHWAVE CITY", 25.0, 1.2, 1.2),
        level("SECTOR 03", "INDUSTRIAL CORE", 50.0, 1.4, 1.3),
        level("SECTOR 04", "THE MATRIX VOID", 75.0, 1.6, 1.5),
        level("CHRONOS", "TEMPORAL GATE", 96.0, 0.0, 0.0),
    ]
}

/// Craft and playfield physics (per reference frame)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub player_x: f32,
    pub player_start_y: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub gravity: f32,
    /// Negative: screen y grows downward
    pub thrust_power: f32,
    pub max_fall_speed: f32,
    pub base_speed: f32,
    /// Target tilt per unit of vertical velocity
    pub tilt_factor: f32,
    pub tilt_damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            player_x: PLAYER_X,
            player_start_y: PLAYER_START_Y,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            gravity: GRAVITY,
            thrust_power: THRUST_POWER,
            max_fall_speed: MAX_FALL_SPEED,
            base_speed: BASE_SPEED,
            tilt_factor: 0.05,
            tilt_damping: 0.1,
        }
    }
}

/// Base spawn chances per reference frame, before level multipliers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub obstacle_rate: f32,
    pub powerup_rate: f32,
    pub data_log_rate: f32,
    /// How far past the right edge new obstacles appear
    pub obstacle_margin: f32,
    /// Entities left of this x are culled
    pub cull_x: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            obstacle_rate: 0.015,
            powerup_rate: 0.005,
            data_log_rate: 0.003,
            obstacle_margin: 50.0,
            cull_x: -100.0,
        }
    }
}

/// Energy economy for both secondary-action variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub max_energy: f32,
    pub recharge_rate: f32,
    pub emp_cost: f32,
    pub emp_radius: f32,
    pub emp_growth: f32,
    /// Flat score for each obstacle an EMP disables
    pub emp_disable_score: u64,
    /// Energy per reference frame while phasing
    pub phase_drain: f32,
    /// Energy restored by scanning an obstacle
    pub scan_reward: f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            max_energy: MAX_ENERGY,
            recharge_rate: ENERGY_RECHARGE_RATE,
            emp_cost: EMP_COST,
            emp_radius: EMP_RADIUS,
            emp_growth: 15.0,
            emp_disable_score: 50,
            phase_drain: 0.4,
            scan_reward: 15.0,
        }
    }
}

/// Damage, invincibility and combo tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub collision_damage: f32,
    pub hit_invincibility_secs: f32,
    pub max_combo: u32,
    pub combo_decay_secs: f32,
    /// Score per unit of distance, before the combo multiplier
    pub score_rate: f32,
    /// Base reward for scanning each obstacle type
    pub obstacle_scores: ObstacleScores,
}

/// Scan rewards per obstacle type (multiplied by the combo)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleScores {
    pub debris: u32,
    pub drone: u32,
    pub server_tower: u32,
    pub energy_barrier: u32,
}

impl Default for ObstacleScores {
    fn default() -> Self {
        Self {
            debris: 50,
            drone: 100,
            server_tower: 150,
            energy_barrier: 75,
        }
    }
}

impl ObstacleScores {
    pub fn for_type(&self, kind: ObstacleType) -> u32 {
        match kind {
            ObstacleType::Debris => self.debris,
            ObstacleType::Drone => self.drone,
            ObstacleType::ServerTower => self.server_tower,
            ObstacleType::EnergyBarrier => self.energy_barrier,
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            collision_damage: 20.0,
            hit_invincibility_secs: 1.0,
            max_combo: 8,
            combo_decay_secs: 3.0,
            score_rate: 0.1,
            obstacle_scores: ObstacleScores::default(),
        }
    }
}

/// Powerup effect strengths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupConfig {
    pub repair_amount: f32,
    pub shield_secs: f32,
    pub overclock_secs: f32,
    pub overclock_multiplier: f32,
    pub god_mode_secs: f32,
    pub god_mode_bonus: u64,
}

impl Default for PowerupConfig {
    fn default() -> Self {
        Self {
            repair_amount: 30.0,
            shield_secs: 5.0,
            overclock_secs: 8.0,
            overclock_multiplier: 1.5,
            god_mode_secs: 10.0,
            god_mode_bonus: 500,
        }
    }
}

/// A line of dialogue shown when progress passes `progress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryMoment {
    pub progress: f32,
    pub id: String,
    pub speaker: String,
    pub text: String,
}

/// A lore data log pushed into the world when progress passes `progress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoreFragment {
    pub progress: f32,
    pub message: String,
}

/// A landmark pushed into the world when progress passes `progress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSpawn {
    pub progress: f32,
    /// Landmark type, also its one-shot trigger key
    pub kind: String,
    pub name: String,
}

/// Narrative content tables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub story_moments: Vec<StoryMoment>,
    pub fragments: Vec<LoreFragment>,
    pub landmarks: Vec<LandmarkSpawn>,
    /// Messages for randomly spawned data logs
    pub data_logs: Vec<String>,
    pub dialogue_secs: f32,
    pub log_secs: f32,
}

impl NarrativeConfig {
    /// Story moment by dialogue id
    pub fn story_moment(&self, id: &str) -> Option<&StoryMoment> {
        self.story_moments.iter().find(|m| m.id == id)
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        let moment = |progress: f32, id: &str, speaker: &str, text: &str| StoryMoment {
            progress,
            id: id.to_string(),
            speaker: speaker.to_string(),
            text: text.to_string(),
        };
        let fragment = |progress: f32, message: &str| LoreFragment {
            progress,
            message: message.to_string(),
        };
        let landmark = |progress: f32, kind: &str, name: &str| LandmarkSpawn {
            progress,
            kind: kind.to_string(),
            name: name.to_string(),
        };
        Self {
            story_moments: vec![
                moment(
                    0.01,
                    "act1_start",
                    "KRAMPUS",
                    "Systems online. Scavenger Unit 01 active. Locating source.",
                ),
                moment(
                    0.10,
                    "act1_sys",
                    "SYSTEM",
                    "WARNING: UNAUTHORIZED SECTOR. DEPLOYING DRONES.",
                ),
                moment(
                    0.30,
                    "act2_start",
                    "KRAMPUS",
                    "The forest... it's holographic? No... hard light projections.",
                ),
                moment(
                    0.55,
                    "act3_start",
                    "KRAMPUS",
                    "This factory. It produced billions of units. Now silent.",
                ),
                moment(
                    0.65,
                    "act3_sys",
                    "SYSTEM",
                    "ERROR: MAINFRAME 'SANTA' NOT FOUND. LAST LOGIN: 842 YEARS AGO.",
                ),
                moment(
                    0.80,
                    "act4_start",
                    "KRAMPUS",
                    "The ice preserves everything. Even memories.",
                ),
                moment(
                    0.96,
                    "act5_start",
                    "SYSTEM",
                    "TEMPORAL ANOMALY DETECTED. CHRONOS PROTOCOL ENGAGED.",
                ),
            ],
            fragments: vec![
                fragment(0.15, "Krampus: This tech... it's older than the city."),
                fragment(0.45, "Krampus: Why protect this path? What lies at the end?"),
                fragment(0.85, "Krampus: The signal is deafening here."),
            ],
            landmarks: vec![
                landmark(0.35, "HOLO_TREE", "Project: Evergreen"),
                landmark(0.60, "RUINED_FACTORY", "Sector 12: Workshop"),
                // Must not come after the ending threshold: distance is held once it starts
                landmark(0.96, "CHRONOS_RING", "The Time Machine"),
            ],
            data_logs: vec![
                "LOG 0492: 'Solar flares destroyed the grid...'".to_string(),
                "LOG 1102: 'Does anyone remember the Red Man?'".to_string(),
                "LOG 2931: 'Energy signature detected North...'".to_string(),
                "LOG 4401: 'The gift fabrication units are rusting.'".to_string(),
            ],
            dialogue_secs: 6.0,
            log_secs: 4.0,
        }
    }
}

/// Scripted ending timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndingConfig {
    /// Progress ratio that starts the approach
    pub threshold: f32,
    /// Scroll speed multiplier while approaching
    pub speed_factor: f32,
    /// Player y the craft is eased toward (top edge)
    pub anchor_y: f32,
    pub anchor_rate: f32,
    /// Landmark kind whose arrival triggers the transition
    pub landmark: String,
    pub trigger_x: f32,
    pub min_approach_secs: f32,
    pub transition_delay_secs: f32,
    /// Scroll speed (per reference frame) during the cinematic
    pub cinematic_speed: f32,
    pub cinematic_secs: f32,
}

impl Default for EndingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.96,
            speed_factor: 0.5,
            anchor_y: PLAYFIELD_HEIGHT / 2.0,
            anchor_rate: 0.05,
            landmark: "CHRONOS_RING".to_string(),
            trigger_x: 300.0,
            min_approach_secs: 4.0,
            transition_delay_secs: 2.0,
            cinematic_speed: 2.0,
            cinematic_secs: 12.0,
        }
    }
}

/// Output volume preferences for the audio collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }
}

/// Complete read-only configuration for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub mode: GameMode,
    pub secondary: SecondaryAction,
    pub victory_distance: f32,
    pub total_time_secs: f32,
    /// Snapshot rate for presentation
    pub snapshot_hz: f32,
    pub max_particles: usize,
    pub physics: PhysicsConfig,
    pub spawn: SpawnConfig,
    pub energy: EnergyConfig,
    pub combat: CombatConfig,
    pub powerups: PowerupConfig,
    pub levels: Vec<LevelConfig>,
    pub narrative: NarrativeConfig,
    pub ending: EndingConfig,
    pub audio: AudioSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Story,
            secondary: SecondaryAction::Emp,
            victory_distance: VICTORY_DISTANCE,
            total_time_secs: TOTAL_GAME_TIME_SECONDS,
            snapshot_hz: 10.0,
            max_particles: 256,
            physics: PhysicsConfig::default(),
            spawn: SpawnConfig::default(),
            energy: EnergyConfig::default(),
            combat: CombatConfig::default(),
            powerups: PowerupConfig::default(),
            levels: default_levels(),
            narrative: NarrativeConfig::default(),
            ending: EndingConfig::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Level for an index, falling back to level 0 for anything missing
    pub fn level(&self, index: usize) -> &LevelConfig {
        self.levels
            .get(index)
            .or_else(|| self.levels.first())
            .unwrap_or_else(|| &*FALLBACK_LEVEL)
    }

    /// Whether narrative, data logs and the ending are active
    pub fn is_story(&self) -> bool {
        self.mode == GameMode::Story
    }

    /// Highest y the craft's top edge may reach
    pub fn max_player_y(&self) -> f32 {
        (self.physics.playfield_height - self.physics.player_height).max(0.0)
    }

    /// Check every startup invariant
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.victory_distance.is_finite() && self.victory_distance > 0.0) {
            return Err(ConfigError::NonPositiveVictoryDistance(self.victory_distance));
        }

        let physics = &self.physics;
        if physics.player_height <= 0.0 || physics.player_height > physics.playfield_height {
            return Err(ConfigError::PlayerDoesNotFit {
                player: physics.player_height,
                playfield: physics.playfield_height,
            });
        }
        validate_positive("max_fall_speed", physics.max_fall_speed)?;
        validate_positive("energy.max_energy", self.energy.max_energy)?;
        validate_positive("snapshot_hz", self.snapshot_hz)?;
        if self.combat.max_combo == 0 {
            return Err(ConfigError::UnsafeConstant {
                name: "combat.max_combo",
                value: 0.0,
                safe_range: "[1, ∞)",
            });
        }

        self.validate_levels()?;

        if self.is_story() {
            self.validate_ending()?;
        }
        Ok(())
    }

    fn validate_levels(&self) -> ConfigResult<()> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        for (index, pair) in self.levels.windows(2).enumerate() {
            if pair[1].threshold < pair[0].threshold {
                return Err(ConfigError::ThresholdsNotAscending {
                    index: index + 1,
                    threshold: pair[1].threshold,
                    previous: pair[0].threshold,
                });
            }
        }
        for (level, config) in self.levels.iter().enumerate() {
            if let Some(bad) = config
                .obstacles
                .iter()
                .find(|w| !w.weight.is_finite() || w.weight < 0.0)
            {
                return Err(ConfigError::InvalidWeight {
                    level,
                    kind: bad.kind.as_str(),
                });
            }
        }
        Ok(())
    }

    /// The ending stalls forever unless its landmark spawns before distance is held.
    fn validate_ending(&self) -> ConfigResult<()> {
        let ending = &self.ending;
        let spawn = self
            .narrative
            .landmarks
            .iter()
            .filter(|l| l.kind == ending.landmark)
            .min_by(|a, b| a.progress.total_cmp(&b.progress))
            .ok_or_else(|| ConfigError::EndingLandmarkMissing(ending.landmark.clone()))?;

        if spawn.progress > ending.threshold {
            return Err(ConfigError::EndingLandmarkTooLate {
                key: spawn.kind.clone(),
                progress: spawn.progress,
                threshold: ending.threshold,
            });
        }
        Ok(())
    }
}

fn validate_positive(name: &'static str, value: f32) -> ConfigResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}
