//! Dominant-frequency extraction for the foundation tone
//!
//! A frequency embedded in the file name wins outright. Otherwise a single
//! window at the temporal midpoint is transformed and the loudest bin below
//! the search ceiling is reported.

use super::round_tenth;
use crate::model::{FrequencyInfo, FrequencySource, Signal};
use crate::window::hann_window;
use regex::Regex;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::sync::OnceLock;

/// Analysis window length in samples
pub const FFT_SIZE: usize = 2048;
/// Highest frequency considered a candidate tone
pub const MAX_SEARCH_HZ: f64 = 1000.0;
/// Results at or below this are treated as noise floor
pub const NOISE_FLOOR_HZ: f64 = 5.0;
/// Divisors applied to the pulse rate for BPM suggestions
const BPM_DIVISORS: [f64; 4] = [6.0, 8.0, 10.0, 12.0];

static HINT_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Spectral peak picker with a file-name shortcut
#[derive(Debug, Clone)]
pub struct FrequencyAnalyzer {
    fft_size: usize,
    max_frequency: f64,
}

impl FrequencyAnalyzer {
    pub fn new() -> Self {
        Self {
            fft_size: FFT_SIZE,
            max_frequency: MAX_SEARCH_HZ,
        }
    }

    /// Override the search ceiling (Hz)
    pub fn with_max_frequency(mut self, max_frequency: f64) -> Self {
        self.max_frequency = max_frequency;
        self
    }

    /// Find the dominant frequency of `signal`.
    ///
    /// Returns `None` when no credible tone is present.
    pub fn analyze(&self, signal: &Signal, file_name: Option<&str>) -> Option<FrequencyInfo> {
        if let Some(hz) = file_name.and_then(parse_frequency_hint) {
            log::info!("Using frequency hint from file name: {:.1} Hz", hz);
            return Some(FrequencyInfo::derive(hz, FrequencySource::Hint));
        }

        let hz = self.spectral_peak(signal)?;
        log::info!("Dominant frequency: {:.1} Hz", hz);
        Some(FrequencyInfo::derive(hz, FrequencySource::Spectrum))
    }

    /// Frequency of the loudest bin in the midpoint window
    pub fn spectral_peak(&self, signal: &Signal) -> Option<f64> {
        let samples = signal.first_channel();
        if samples.is_empty() {
            return None;
        }

        let n = self.fft_size;
        let start = (samples.len() / 2).saturating_sub(n / 2);
        let window = hann_window(n);

        let mut buffer: Vec<Complex<f32>> = (0..n)
            .map(|i| {
                let s = samples.get(start + i).copied().unwrap_or(0.0);
                Complex::new(s * window[i], 0.0)
            })
            .collect();

        let mut planner = FftPlanner::new();
        planner.plan_fft_forward(n).process(&mut buffer);

        let resolution = signal.sample_rate() as f64 / n as f64;
        let max_bin = ((self.max_frequency / resolution) as usize).min(n / 2);

        let (peak_bin, peak_mag) = (1..=max_bin)
            .map(|bin| (bin, buffer[bin].norm()))
            .fold((0, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });

        if peak_bin == 0 || peak_mag <= f32::EPSILON {
            log::debug!("No spectral peak above silence");
            return None;
        }

        let hz = round_tenth(peak_bin as f64 * resolution);
        if hz <= NOISE_FLOOR_HZ {
            log::debug!("Spectral peak {:.1} Hz is below the noise floor", hz);
            return None;
        }
        Some(hz)
    }
}

impl Default for FrequencyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyInfo {
    /// Attach pulse rate and BPM suggestions to a frequency
    pub fn derive(frequency: f64, source: FrequencySource) -> Self {
        let pulse_rate = frequency * 60.0;
        Self {
            frequency,
            source,
            pulse_rate: round_tenth(pulse_rate),
            bpm_suggestions: BPM_DIVISORS.map(|d| round_tenth(pulse_rate / d)),
        }
    }
}

/// Parse a frequency like `432hz`, `7.83Hz` or `7_83HZ` out of a file name
pub fn parse_frequency_hint(file_name: &str) -> Option<f64> {
    let pattern = HINT_PATTERN
        .get_or_init(|| Regex::new(r"(?i)(\d+(?:[._]\d*)?)hz").ok())
        .as_ref()?;

    let caps = pattern.captures(file_name)?;
    let digits = caps[1].replace('_', ".");
    let hz: f64 = digits.trim_end_matches('.').parse().ok()?;

    (hz.is_finite() && hz > 0.0).then_some(hz)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: u32, seconds: f64) -> Signal {
        let len = (sample_rate as f64 * seconds) as usize;
        let samples = (0..len)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin() as f32)
            .collect();
        Signal::mono(samples, sample_rate).unwrap()
    }

    #[test]
    fn test_recovers_440hz_within_one_bin() {
        let signal = sine(440.0, 44100, 1.0);
        let hz = FrequencyAnalyzer::new().spectral_peak(&signal).unwrap();
        let bin_width = 44100.0 / FFT_SIZE as f64;
        assert!((hz - 440.0).abs() <= bin_width, "got {hz}");
    }

    #[test]
    fn test_silence_has_no_frequency() {
        let signal = Signal::mono(vec![0.0; 44100], 44100).unwrap();
        assert!(FrequencyAnalyzer::new().analyze(&signal, None).is_none());
    }

    #[test]
    fn test_tones_above_ceiling_are_ignored() {
        // Peak at 3 kHz lies outside the search range, so only leakage is seen
        let signal = sine(3000.0, 44100, 1.0);
        if let Some(hz) = FrequencyAnalyzer::new().spectral_peak(&signal) {
            assert!(hz <= MAX_SEARCH_HZ);
        }
    }

    #[test]
    fn test_result_is_above_noise_floor() {
        let signal = sine(2.0, 8000, 2.0);
        if let Some(hz) = FrequencyAnalyzer::new().spectral_peak(&signal) {
            assert!(hz > NOISE_FLOOR_HZ);
        }
    }

    #[test]
    fn test_short_signal_is_zero_padded() {
        let signal = sine(200.0, 44100, 0.02);
        let hz = FrequencyAnalyzer::new().spectral_peak(&signal).unwrap();
        assert!((hz - 200.0).abs() < 50.0, "got {hz}");
    }

    #[test]
    fn test_hint_parsing() {
        assert_eq!(parse_frequency_hint("tone_432hz.wav"), Some(432.0));
        assert_eq!(parse_frequency_hint("schumann 7.83Hz.flac"), Some(7.83));
        assert_eq!(parse_frequency_hint("schumann_7_83HZ.mp3"), Some(7.83));
        assert_eq!(parse_frequency_hint("ambience.wav"), None);
    }

    #[test]
    fn test_hint_skips_spectrum() {
        let signal = sine(440.0, 44100, 1.0);
        let info = FrequencyAnalyzer::new()
            .analyze(&signal, Some("drone_528hz.wav"))
            .unwrap();
        assert_eq!(info.frequency, 528.0);
        assert_eq!(info.source, FrequencySource::Hint);
    }

    #[test]
    fn test_derived_values() {
        let info = FrequencyInfo::derive(2.0, FrequencySource::Spectrum);
        assert_eq!(info.pulse_rate, 120.0);
        assert_eq!(info.bpm_suggestions, [20.0, 15.0, 12.0, 10.0]);
    }
}
