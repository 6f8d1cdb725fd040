//! Raw tempo candidate estimators
//!
//! Each estimator produces zero or more raw BPM readings; reducing them to a
//! single estimate is the aggregator's job.

use super::round_tenth;
use crate::model::Signal;

/// Lowest tempo accepted as a raw candidate (exclusive)
pub const MIN_RAW_BPM: f64 = 40.0;
/// Highest tempo accepted as a raw candidate (exclusive)
pub const MAX_RAW_BPM: f64 = 300.0;

/// Source of raw tempo candidates
pub trait TempoEstimator {
    /// Short identifier recorded in `TempoEstimate::algorithms_used`
    fn name(&self) -> &'static str;

    /// Raw BPM candidates, possibly empty
    fn estimate(&self, signal: &Signal) -> Vec<f64>;
}

/// Envelope frames per second used by autocorrelation
const ENVELOPE_RATE: usize = 100;
/// Lag range in envelope frames (200 BPM down to 60 BPM)
const MIN_LAG: usize = 30;
const MAX_LAG: usize = 100;
/// Autocorrelation result ceiling (exclusive)
const MAX_AUTOCORR_BPM: f64 = 250.0;

/// Onset-envelope autocorrelation (accurate mode)
#[derive(Debug, Clone, Copy, Default)]
pub struct AutocorrelationEstimator;

impl AutocorrelationEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Half-wave rectified first difference of block energy at 100 Hz
    fn onset_envelope(samples: &[f32], sample_rate: u32) -> Vec<f64> {
        let block = (sample_rate as usize / ENVELOPE_RATE).max(1);
        let energy: Vec<f64> = samples
            .chunks_exact(block)
            .map(|c| c.iter().map(|&s| (s as f64) * (s as f64)).sum())
            .collect();

        let mut envelope = vec![0.0; energy.len()];
        for i in 1..energy.len() {
            envelope[i] = (energy[i] - energy[i - 1]).max(0.0);
        }
        envelope
    }
}

impl TempoEstimator for AutocorrelationEstimator {
    fn name(&self) -> &'static str {
        "autocorrelation"
    }

    fn estimate(&self, signal: &Signal) -> Vec<f64> {
        let env = Self::onset_envelope(signal.first_channel(), signal.sample_rate());

        let mut best_lag = 0;
        let mut best_score = 0.0;
        for lag in MIN_LAG..=MAX_LAG.min(env.len().saturating_sub(1)) {
            let score: f64 = env.iter().zip(&env[lag..]).map(|(a, b)| a * b).sum();
            if score > best_score {
                best_score = score;
                best_lag = lag;
            }
        }

        if best_lag == 0 {
            log::debug!("Autocorrelation found no periodic onsets");
            return Vec::new();
        }

        let bpm = 60.0 * ENVELOPE_RATE as f64 / best_lag as f64;
        log::debug!("Autocorrelation: lag {} -> {:.1} BPM", best_lag, bpm);

        if bpm > MIN_RAW_BPM && bpm < MAX_AUTOCORR_BPM {
            vec![bpm]
        } else {
            Vec::new()
        }
    }
}

/// Hop sizes (seconds) for the multi-pass peak estimator
pub const PEAK_HOP_SIZES: [f64; 6] = [0.03, 0.05, 0.08, 0.10, 0.12, 0.15];
/// Most samples inspected per block
const MAX_INSPECTED_PER_BLOCK: usize = 3000;
/// Block maximum that counts as a peak (exclusive)
const PEAK_THRESHOLD: f32 = 0.15;
/// Fewest peaks needed for a usable pass
const MIN_PEAKS: usize = 5;
/// Plausible single-beat interval range in seconds (exclusive)
const MIN_BEAT_INTERVAL: f64 = 0.2;
const MAX_BEAT_INTERVAL: f64 = 2.0;

/// Multi-pass amplitude peak clustering (fast mode)
#[derive(Debug, Clone)]
pub struct PeakClusterEstimator {
    hop_sizes: Vec<f64>,
}

impl PeakClusterEstimator {
    pub fn new() -> Self {
        Self {
            hop_sizes: PEAK_HOP_SIZES.to_vec(),
        }
    }

    /// Run with a custom set of hop sizes (seconds)
    pub fn with_hop_sizes(hop_sizes: Vec<f64>) -> Self {
        Self { hop_sizes }
    }

    /// Start times (seconds) of blocks whose strided peak exceeds the threshold
    pub fn detect_peaks(samples: &[f32], sample_rate: u32, hop_seconds: f64) -> Vec<f64> {
        let hop = ((hop_seconds * sample_rate as f64).round() as usize).max(1);
        let stride = hop.div_ceil(MAX_INSPECTED_PER_BLOCK).max(1);

        samples
            .chunks(hop)
            .enumerate()
            .filter(|(_, block)| {
                block
                    .iter()
                    .step_by(stride)
                    .any(|s| s.abs() > PEAK_THRESHOLD)
            })
            .map(|(i, _)| (i * hop) as f64 / sample_rate as f64)
            .collect()
    }

    /// Tempo for one hop size, or `None` if the pass is unusable
    pub fn estimate_pass(samples: &[f32], sample_rate: u32, hop_seconds: f64) -> Option<f64> {
        let peaks = Self::detect_peaks(samples, sample_rate, hop_seconds);
        if peaks.len() < MIN_PEAKS {
            return None;
        }

        let mut intervals: Vec<f64> = peaks
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|&d| d > MIN_BEAT_INTERVAL && d < MAX_BEAT_INTERVAL)
            .collect();
        if intervals.is_empty() {
            return None;
        }

        intervals.sort_by(f64::total_cmp);
        // Lower median
        let median = intervals[(intervals.len() - 1) / 2];
        let bpm = 60.0 / median;

        (bpm > MIN_RAW_BPM && bpm < MAX_RAW_BPM).then(|| round_tenth(bpm))
    }
}

impl Default for PeakClusterEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoEstimator for PeakClusterEstimator {
    fn name(&self) -> &'static str {
        "peak-clustering"
    }

    fn estimate(&self, signal: &Signal) -> Vec<f64> {
        let samples = signal.first_channel();
        self.hop_sizes
            .iter()
            .filter_map(|&hop| {
                let pass = Self::estimate_pass(samples, signal.sample_rate(), hop);
                log::debug!("Peak pass (hop {:.2}s): {:?}", hop, pass);
                pass
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clicks of `width` samples at `bpm`, silence elsewhere
    fn click_track(bpm: f64, seconds: f64, sample_rate: u32) -> Signal {
        let len = (seconds * sample_rate as f64) as usize;
        let spacing = (60.0 / bpm * sample_rate as f64) as usize;
        let mut samples = vec![0.0f32; len];
        for start in (0..len).step_by(spacing) {
            for s in samples.iter_mut().skip(start).take(200) {
                *s = 0.9;
            }
        }
        Signal::mono(samples, sample_rate).unwrap()
    }

    #[test]
    fn test_peak_pass_recovers_120_bpm() {
        let signal = click_track(120.0, 20.0, 44100);
        for hop in [0.05, 0.10] {
            let bpm = PeakClusterEstimator::estimate_pass(signal.first_channel(), 44100, hop).unwrap();
            assert!((bpm - 120.0).abs() <= 2.0, "hop {hop}: {bpm}");
        }
    }

    #[test]
    fn test_peak_passes_stay_plausible() {
        let signal = click_track(120.0, 20.0, 44100);
        let passes = PeakClusterEstimator::new().estimate(&signal);
        assert_eq!(passes.len(), PEAK_HOP_SIZES.len());
        assert!(passes.iter().all(|&b| b > MIN_RAW_BPM && b < MAX_RAW_BPM));
    }

    #[test]
    fn test_even_interval_count_takes_lower_median() {
        // Seven peaks: intervals 0.5, 0.5, 0.5, 1.0, 1.0, 1.0 seconds
        let rate = 1000;
        let mut samples = vec![0.0f32; 6000];
        for start in [0, 500, 1000, 1500, 2500, 3500, 4500] {
            samples[start] = 0.9;
        }
        let bpm = PeakClusterEstimator::estimate_pass(&samples, rate, 0.05).unwrap();
        assert_eq!(bpm, 120.0);
    }

    #[test]
    fn test_too_few_peaks_is_invalid() {
        let signal = click_track(120.0, 1.5, 44100);
        assert_eq!(
            PeakClusterEstimator::estimate_pass(signal.first_channel(), 44100, 0.05),
            None
        );
    }

    #[test]
    fn test_quiet_signal_has_no_peaks() {
        let signal = Signal::mono(vec![0.1; 44100 * 5], 44100).unwrap();
        assert!(PeakClusterEstimator::new().estimate(&signal).is_empty());
    }

    #[test]
    fn test_autocorrelation_recovers_120_bpm() {
        let signal = click_track(120.0, 20.0, 44100);
        let passes = AutocorrelationEstimator::new().estimate(&signal);
        assert_eq!(passes.len(), 1);
        assert!((passes[0] - 120.0).abs() <= 2.0, "got {}", passes[0]);
    }

    #[test]
    fn test_autocorrelation_silence() {
        let signal = Signal::mono(vec![0.0; 44100 * 5], 44100).unwrap();
        assert!(AutocorrelationEstimator::new().estimate(&signal).is_empty());
    }
}
