use serde::{Deserialize, Serialize};

/// Loop-safe cut points within a music track, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopBoundaries {
    /// End of the intro / start of the loop region
    pub intro_end: f64,

    /// End of the loop region / start of the outro
    pub outro_start: f64,

    /// Whether a safe loop region was found.
    /// When false the values span the whole track.
    pub detected: bool,
}

impl LoopBoundaries {
    /// Boundaries spanning the whole track (no safe loop region)
    pub fn undetected(duration: f64) -> Self {
        Self {
            intro_end: 0.0,
            outro_start: duration,
            detected: false,
        }
    }

    /// Caller-supplied boundaries, treated as detected
    pub fn manual(intro_end: f64, outro_start: f64) -> Self {
        Self {
            intro_end,
            outro_start,
            detected: true,
        }
    }

    /// Rescale boundaries onto a timeline stretched by `rate`
    pub fn scaled(&self, rate: f64) -> Self {
        Self {
            intro_end: self.intro_end / rate,
            outro_start: self.outro_start / rate,
            detected: self.detected,
        }
    }

    /// Length of the repeatable region
    pub fn loop_duration(&self) -> f64 {
        self.outro_start - self.intro_end
    }
}
