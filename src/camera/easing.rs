//! Easing curves and time-based tweens
//!
//! A tween is a pure function of the current time, so frames may be skipped or
//! coalesced without drift.

/// Cubic ease-in-out.
pub fn cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Sinusoidal ease-in-out.
pub fn sin_in_out(t: f64) -> f64 {
    (1.0 - (std::f64::consts::PI * t.clamp(0.0, 1.0)).cos()) / 2.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub start: f64,
    pub duration: f64,
}

impl Tween {
    pub fn new(start: f64, duration: f64) -> Self {
        Self { start, duration }
    }

    /// Linear progress in `[0, 1]`. A zero duration completes immediately.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}
