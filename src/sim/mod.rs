//! Simulation module
//!
//! All gameplay logic lives here. This module is pure with respect to the
//! outside world:
//! - Variable timestep, clamped per tick
//! - Seeded RNG only
//! - Audio and presentation only via drained events
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod ending;
pub mod narrative;
pub mod physics;
pub mod progression;
pub mod schedule;
pub mod scoring;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;

pub use autopilot::autopilot;
pub use clock::FrameClock;
pub use collision::{CollisionReport, aabb_overlap, resolve_collisions};
pub use ending::{EndingPhase, EndingState};
pub use narrative::{NarrativePayload, NarrativeScript};
pub use progression::{progress_ratio, select_level};
pub use schedule::{Schedule, ScheduledEvent};
pub use snapshot::{HudSnapshot, SnapshotThrottle};
pub use state::{
    ActiveDialogue, ActiveLog, DataLog, EmpBurst, Entity, GameEvent, GameState, Landmark,
    Obstacle, ObstacleKind, Particle, ParticleKind, Player, Powerup, PowerupKind, Rect, RunPhase,
    ScorePopup,
};
pub use tick::{TickInput, tick};
