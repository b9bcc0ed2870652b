//! Configuration errors
//!
//! Everything that can go wrong is detected before a run starts. The tick
//! itself is infallible: runtime oddities fall back to safe defaults.

use thiserror::Error;

/// A configuration rejected by [`crate::GameConfig::validate`] or loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Progress is `distance / victory_distance`, so this must be positive.
    #[error("victory distance must be positive, got {0}")]
    NonPositiveVictoryDistance(f32),

    #[error("level table is empty")]
    NoLevels,

    /// Thresholds must be ascending so the top-down scan picks the right band.
    #[error("level {index} threshold {threshold}% is below the previous level's {previous}%")]
    ThresholdsNotAscending {
        index: usize,
        threshold: f32,
        previous: f32,
    },

    #[error("obstacle weight for {kind} in level {level} is negative or not finite")]
    InvalidWeight { level: usize, kind: &'static str },

    /// The player craft must fit inside the playfield.
    #[error("player height {player} does not fit playfield height {playfield}")]
    PlayerDoesNotFit { player: f32, playfield: f32 },

    #[error("constant '{name}' = {value} is outside safe range {safe_range}")]
    UnsafeConstant {
        name: &'static str,
        value: f32,
        safe_range: &'static str,
    },

    /// The ending waits on this landmark; without it the run never finishes.
    #[error("ending landmark '{0}' is not in the landmark table")]
    EndingLandmarkMissing(String),

    /// Distance is held once the ending starts, so a later landmark never spawns.
    #[error(
        "ending landmark '{key}' spawns at progress {progress}, after the ending threshold {threshold}"
    )]
    EndingLandmarkTooLate {
        key: String,
        progress: f32,
        threshold: f32,
    },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience alias: a `Result` using `ConfigError` as the error type.
pub type ConfigResult<T> = Result<T, ConfigError>;
