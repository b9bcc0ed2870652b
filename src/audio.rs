//! One-way audio cue sink
//!
//! The simulation only names what should be heard; a backend turns cues into
//! sound. Playback is fire-and-forget: a failing backend is logged and, after
//! repeated failures, switched off. It never reaches back into the tick.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AudioSettings;

/// Consecutive backend failures before audio is switched off for the session
const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Sound requests emitted by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AudioCue {
    /// EMP fired
    Emp,
    /// Secondary action refused for lack of energy
    LowEnergy,
    /// Hull hit
    Damage,
    /// Data log picked up
    CollectData,
    PowerUp,
    /// Obstacle scanned while phasing or shielded
    Scan,
    /// Continuous engine pitch, sent only when it changes
    EnginePitch(f32),
    /// Switch to the music for a level index
    LevelMusic(usize),
    StopMusic,
    EndingMusicStart,
    EndingMusicStop,
}

impl AudioCue {
    pub fn is_music(&self) -> bool {
        matches!(
            self,
            AudioCue::LevelMusic(_)
                | AudioCue::StopMusic
                | AudioCue::EndingMusicStart
                | AudioCue::EndingMusicStop
        )
    }

    /// Cues that silence something; delivered even when muted
    fn is_stop(&self) -> bool {
        matches!(self, AudioCue::StopMusic | AudioCue::EndingMusicStop)
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio device unavailable")]
    Unavailable,
    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Something that can play cues
pub trait AudioSink {
    fn play(&mut self, cue: &AudioCue, volume: f32) -> Result<(), AudioError>;
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: &AudioCue, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Writes cues to the log at debug level (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: &AudioCue, volume: f32) -> Result<(), AudioError> {
        log::debug!("audio {:?} @ {:.2}", cue, volume);
        Ok(())
    }
}

/// Keeps every delivered cue, for tests
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub played: Vec<(AudioCue, f32)>,
}

impl RecordingAudio {
    pub fn count(&self, cue: &AudioCue) -> usize {
        self.played.iter().filter(|(c, _)| c == cue).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: &AudioCue, volume: f32) -> Result<(), AudioError> {
        self.played.push((cue.clone(), volume));
        Ok(())
    }
}

/// Volume-aware front for an [`AudioSink`]
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    failures: u32,
    disabled: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S, settings: &AudioSettings) -> Self {
        Self {
            sink,
            master_volume: settings.master_volume.clamp(0.0, 1.0),
            sfx_volume: settings.sfx_volume.clamp(0.0, 1.0),
            music_volume: settings.music_volume.clamp(0.0, 1.0),
            muted: settings.muted,
            failures: 0,
            disabled: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn effective_volume(&self, cue: &AudioCue) -> f32 {
        if self.muted {
            return 0.0;
        }
        let channel = if cue.is_music() {
            self.music_volume
        } else {
            self.sfx_volume
        };
        self.master_volume * channel
    }

    /// Forward a cue; failures are logged and swallowed
    pub fn play(&mut self, cue: &AudioCue) {
        if self.disabled {
            return;
        }
        let vol = self.effective_volume(cue);
        if vol <= 0.0 && !cue.is_stop() {
            return;
        }

        match self.sink.play(cue, vol) {
            Ok(()) => self.failures = 0,
            Err(err) => {
                self.failures += 1;
                log::warn!("Audio cue {:?} failed: {}", cue, err);
                if self.failures >= MAX_CONSECUTIVE_FAILURES {
                    log::warn!("Audio disabled after {} consecutive failures", self.failures);
                    self.disabled = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenAudio {
        calls: u32,
    }

    impl AudioSink for BrokenAudio {
        fn play(&mut self, _cue: &AudioCue, _volume: f32) -> Result<(), AudioError> {
            self.calls += 1;
            Err(AudioError::Unavailable)
        }
    }

    #[test]
    fn test_music_and_sfx_channels() {
        let settings = AudioSettings::default();
        let mut audio = AudioManager::new(RecordingAudio::default(), &settings);
        audio.play(&AudioCue::Damage);
        audio.play(&AudioCue::LevelMusic(1));
        let played = &audio.sink().played;
        assert!((played[0].1 - settings.master_volume * settings.sfx_volume).abs() < 1e-6);
        assert!((played[1].1 - settings.master_volume * settings.music_volume).abs() < 1e-6);
    }

    #[test]
    fn test_volume_setters_clamp_and_apply() {
        let mut audio = AudioManager::new(RecordingAudio::default(), &AudioSettings::default());
        audio.set_master_volume(2.0);
        audio.set_sfx_volume(0.5);
        audio.set_music_volume(-1.0);
        audio.play(&AudioCue::Scan);
        audio.play(&AudioCue::LevelMusic(2));
        audio.play(&AudioCue::StopMusic);
        assert_eq!(
            audio.sink().played,
            vec![(AudioCue::Scan, 0.5), (AudioCue::StopMusic, 0.0)]
        );
    }

    #[test]
    fn test_muted_still_stops_music() {
        let mut audio = AudioManager::new(RecordingAudio::default(), &AudioSettings::default());
        audio.set_muted(true);
        audio.play(&AudioCue::Emp);
        audio.play(&AudioCue::EndingMusicStop);
        assert_eq!(audio.sink().played, vec![(AudioCue::EndingMusicStop, 0.0)]);
    }

    #[test]
    fn test_failing_backend_is_disabled() {
        let mut audio = AudioManager::new(BrokenAudio { calls: 0 }, &AudioSettings::default());
        for _ in 0..20 {
            audio.play(&AudioCue::Scan);
        }
        assert!(audio.is_disabled());
        assert_eq!(audio.sink().calls, MAX_CONSECUTIVE_FAILURES);
    }
}
