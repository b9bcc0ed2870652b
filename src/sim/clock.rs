//! Frame clock
//!
//! Turns display-refresh timestamps (milliseconds) into a per-tick delta in
//! seconds, clamped so a stall or a backgrounded tab resumes with one ordinary
//! tick instead of a huge catch-up step.

use crate::consts::MAX_FRAME_DT;

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Delta since the previous call, clamped to `[0, max_dt]`.
    ///
    /// The first call after construction or [`FrameClock::reset`] yields 0.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) if now_ms.is_finite() => ((now_ms - last) / 1000.0) as f32,
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_ms = Some(now_ms);
        }
        if dt.is_finite() {
            dt.clamp(0.0, self.max_dt)
        } else {
            0.0
        }
    }

    /// Re-anchor at `now_ms`, e.g. when resuming from the background
    pub fn reset(&mut self, now_ms: f64) {
        self.last_ms = now_ms.is_finite().then_some(now_ms);
    }

    /// Forget the anchor; the next advance yields 0
    pub fn clear(&mut self) {
        self.last_ms = None;
    }
}
