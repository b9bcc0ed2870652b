//! Sleigh Ride headless runner
//!
//! Flies one run with the demo pilot at a simulated 60 Hz and prints the
//! final HUD snapshot as JSON.
//!
//! Usage: `sleigh-ride [config.json] [seed]`

use std::process::ExitCode;

use sleigh_ride::audio::LogAudio;
use sleigh_ride::sim::{GameEvent, HudSnapshot};
use sleigh_ride::{GameConfig, RunOutcome, Session};

const FRAME_MS: f64 = 1000.0 / 60.0;
const DEFAULT_SEED: u64 = 42;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match GameConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{}: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    // Enough frames to cover the distance plus the ending, with headroom
    let ending = &config.ending;
    let frame_budget = (config.victory_distance / config.physics.base_speed.max(0.1)
        + (ending.min_approach_secs + ending.transition_delay_secs + ending.cinematic_secs)
            * 60.0
            * 4.0) as u64;

    let mut session = match Session::new(config, LogAudio) {
        Ok(session) => session,
        Err(err) => {
            log::error!("Invalid config: {}", err);
            return ExitCode::FAILURE;
        }
    };
    session.set_autopilot(true);
    session.start_run(seed, 0.0);

    let mut last_snapshot: Option<HudSnapshot> = None;
    let mut outcome = None;
    for frame in 1..=frame_budget {
        let Some(report) = session.frame(frame as f64 * FRAME_MS) else {
            break;
        };
        for event in &report.events {
            match event {
                GameEvent::LevelChanged { to, .. } => {
                    log::info!("Entering {}", session.config().level(*to).name);
                }
                GameEvent::DialogueStarted { id } => {
                    if let Some(line) = session.config().narrative.story_moment(id) {
                        log::info!("{}: {}", line.speaker, line.text);
                    }
                }
                GameEvent::LogOpened { message } => log::info!("{}", message),
                GameEvent::EndingStarted => log::info!("Approaching the end"),
                _ => {}
            }
        }
        if report.snapshot.is_some() {
            last_snapshot = report.snapshot;
        }
        if report.outcome.is_some() {
            outcome = report.outcome;
            break;
        }
    }

    match outcome {
        Some(RunOutcome::Won) => log::info!("Victory"),
        Some(RunOutcome::Lost) => log::info!("Hull breached"),
        None => log::warn!("Frame budget of {} exhausted", frame_budget),
    }

    let snapshot = last_snapshot
        .unwrap_or_else(|| HudSnapshot::capture(session.state(), session.config()));
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to encode snapshot: {}", err),
    }

    match outcome {
        Some(RunOutcome::Lost) => ExitCode::from(2),
        _ => ExitCode::SUCCESS,
    }
}
