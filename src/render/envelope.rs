//! Gain automation for one scheduled segment

/// Trapezoidal gain curve over a segment's active span.
///
/// Times are on the output timeline in seconds. Gain ramps linearly from 0
/// over `fade_in` seconds after `start`, holds at `gain`, and ramps back to 0
/// over the `fade_out` seconds before `end`. Overlapping ramps take the
/// lower of the two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainEnvelope {
    pub gain: f64,
    pub start: f64,
    pub end: f64,
    pub fade_in: f64,
    pub fade_out: f64,
}

impl GainEnvelope {
    /// Constant gain over `[start, end)`
    pub fn constant(gain: f64, start: f64, end: f64) -> Self {
        Self {
            gain,
            start,
            end,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }

    pub fn with_fade_in(mut self, seconds: f64) -> Self {
        self.fade_in = seconds;
        self
    }

    pub fn with_fade_out(mut self, seconds: f64) -> Self {
        self.fade_out = seconds;
        self
    }

    /// Gain at output time `t`; zero outside `[start, end)`
    pub fn at(&self, t: f64) -> f64 {
        if t < self.start || t >= self.end {
            return 0.0;
        }
        let rise = ramp(t - self.start, self.fade_in);
        let fall = ramp(self.end - t, self.fade_out);
        self.gain * rise.min(fall)
    }
}

/// Linear 0..1 ramp over `length`; a zero-length ramp is always 1
fn ramp(elapsed: f64, length: f64) -> f64 {
    if length <= 0.0 {
        1.0
    } else {
        (elapsed / length).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let env = GainEnvelope::constant(0.5, 1.0, 2.0);
        assert_eq!(env.at(0.5), 0.0);
        assert_eq!(env.at(1.0), 0.5);
        assert_eq!(env.at(1.99), 0.5);
        assert_eq!(env.at(2.0), 0.0);
    }

    #[test]
    fn test_ramps() {
        let env = GainEnvelope::constant(1.0, 0.0, 10.0)
            .with_fade_in(2.0)
            .with_fade_out(4.0);
        assert_eq!(env.at(0.0), 0.0);
        assert!((env.at(1.0) - 0.5).abs() < 1e-12);
        assert_eq!(env.at(5.0), 1.0);
        assert!((env.at(8.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_crossfade_sums_to_unity() {
        // Outgoing segment ends at 10, incoming starts at 7 with a 3s window
        let out = GainEnvelope::constant(1.0, 0.0, 10.0).with_fade_out(3.0);
        let inc = GainEnvelope::constant(1.0, 7.0, 20.0).with_fade_in(3.0);
        for i in 0..30 {
            let t = 7.0 + i as f64 * 0.1;
            assert!((out.at(t) + inc.at(t) - 1.0).abs() < 1e-9, "t={t}");
        }
    }

    #[test]
    fn test_overlapping_ramps_take_minimum() {
        let env = GainEnvelope::constant(1.0, 0.0, 2.0)
            .with_fade_in(2.0)
            .with_fade_out(2.0);
        assert!((env.at(1.0) - 0.5).abs() < 1e-12);
        assert!((env.at(1.5) - 0.25).abs() < 1e-12);
    }
}
