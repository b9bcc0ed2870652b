//! Sleigh Ride - a side-scrolling thrust-and-dodge arcade core
//!
//! Core modules:
//! - `sim`: Per-tick simulation (physics, spawning, collisions, scoring, ending)
//! - `config`: Data-driven tuning and content tables
//! - `audio`: One-way audio cue sink
//! - `session`: Frame-driven loop driver with snapshot throttling

pub mod audio;
pub mod config;
pub mod error;
pub mod session;
pub mod sim;

pub use config::{GameConfig, GameMode, SecondaryAction};
pub use error::ConfigError;
pub use session::{FrameReport, RunOutcome, Session};

/// Game configuration constants
///
/// Defaults for [`GameConfig`]. Rates and accelerations are expressed per
/// reference frame (1/60 s) and scaled by `dt * 60` at runtime.
pub mod consts {
    /// Reference frame rate the per-frame constants were tuned at
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Largest delta-time a single tick may consume (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 1200.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Player craft
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_START_Y: f32 = 300.0;
    pub const PLAYER_WIDTH: f32 = 80.0;
    pub const PLAYER_HEIGHT: f32 = 35.0;
    pub const MAX_INTEGRITY: f32 = 100.0;
    pub const MAX_ENERGY: f32 = 100.0;

    /// Hover/thrust physics (per reference frame)
    pub const GRAVITY: f32 = 0.25;
    pub const THRUST_POWER: f32 = -0.55;
    pub const MAX_FALL_SPEED: f32 = 8.0;
    pub const BASE_SPEED: f32 = 9.0;

    /// Energy economy
    pub const EMP_COST: f32 = 20.0;
    pub const EMP_RADIUS: f32 = 250.0;
    pub const ENERGY_RECHARGE_RATE: f32 = 0.1;

    /// Run length
    pub const TOTAL_GAME_TIME_SECONDS: f32 = 600.0;
    pub const VICTORY_DISTANCE: f32 = 350_000.0;
}

/// Exponential-style approach of `current` toward `target`.
///
/// `rate` is the fraction covered per reference frame; the effective factor
/// is clamped to 1 so large frames land on the target instead of overshooting.
#[inline]
pub fn damp_toward(current: f32, target: f32, rate: f32, time_scale: f32) -> f32 {
    let factor = (rate * time_scale).clamp(0.0, 1.0);
    current + (target - current) * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damp_toward_never_overshoots() {
        assert_eq!(damp_toward(0.0, 10.0, 0.1, 100.0), 10.0);
        let v = damp_toward(0.0, 10.0, 0.1, 1.0);
        assert!((v - 1.0).abs() < 1e-6);
    }
}
