//! Outlier-robust reduction of raw tempo passes into one estimate

use super::round_tenth;
use crate::model::{AnalysisMode, Confidence, TempoEstimate};

/// Canonical tempo range reached by octave correction
pub const MIN_CORRECTED_BPM: f64 = 60.0;
pub const MAX_CORRECTED_BPM: f64 = 200.0;
/// Standard deviation at which confidence drops to low
const UNSTABLE_STD_DEV: f64 = 10.0;
/// Fast mode needs at least this many surviving passes
const MIN_FAST_PASSES: usize = 3;
/// Range alternate candidates must fall in
const MIN_ALTERNATE_BPM: f64 = 40.0;
const MAX_ALTERNATE_BPM: f64 = 220.0;
/// Alternates closer than this to the corrected tempo are dropped
const MIN_ALTERNATE_DISTANCE: f64 = 2.0;

/// Reduce raw passes to a single [`TempoEstimate`].
///
/// A pure function of its inputs: calling it again on the same passes
/// yields an identical estimate.
pub fn aggregate_tempo(
    passes: &[f64],
    mode: AnalysisMode,
    algorithms_used: Vec<String>,
) -> TempoEstimate {
    let all_passes: Vec<f64> = passes
        .iter()
        .copied()
        .filter(|b| b.is_finite() && *b > 0.0)
        .collect();

    if all_passes.is_empty() {
        log::warn!("No usable tempo passes, falling back to default tempo");
        return TempoEstimate::fallback(mode, algorithms_used);
    }

    let filtered_passes = tukey_filter(&all_passes);

    let median_bpm = filtered_passes[filtered_passes.len() / 2];
    let n = filtered_passes.len() as f64;
    let mean = filtered_passes.iter().sum::<f64>() / n;
    let variance = filtered_passes.iter().map(|b| (b - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let mut confidence = match mode {
        AnalysisMode::Accurate => Confidence::High,
        AnalysisMode::Fast => Confidence::Medium,
    };
    if std_dev >= UNSTABLE_STD_DEV
        || (mode == AnalysisMode::Fast && filtered_passes.len() < MIN_FAST_PASSES)
    {
        confidence = Confidence::Low;
    }

    let corrected = round_tenth(octave_correct(median_bpm));
    let candidates = alternate_candidates(corrected);

    log::info!(
        "Tempo: {:.1} BPM (raw {:.1}, std dev {:.2}, {:?} confidence, {}/{} passes kept)",
        corrected,
        median_bpm,
        std_dev,
        confidence,
        filtered_passes.len(),
        all_passes.len()
    );

    TempoEstimate {
        raw: round_tenth(median_bpm),
        corrected,
        candidates,
        std_dev,
        confidence,
        algorithms_used,
        all_passes,
        filtered_passes,
        mode_used: mode,
    }
}

/// Sort and keep values inside the 1.5 x IQR fences.
///
/// A zero IQR keeps everything.
fn tukey_filter(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[(n * 3) / 4];
    let iqr = q3 - q1;

    if iqr == 0.0 {
        return sorted;
    }

    let low = q1 - 1.5 * iqr;
    let high = q3 + 1.5 * iqr;
    sorted.retain(|b| *b >= low && *b <= high);
    sorted
}

/// Fold a positive tempo into [60, 200] by halving/doubling
pub fn octave_correct(bpm: f64) -> f64 {
    if !bpm.is_finite() || bpm <= 0.0 {
        return bpm;
    }
    let mut bpm = bpm;
    while bpm > MAX_CORRECTED_BPM {
        bpm /= 2.0;
    }
    while bpm < MIN_CORRECTED_BPM {
        bpm *= 2.0;
    }
    bpm
}

/// Half, 1.5x and double readings of the corrected tempo
fn alternate_candidates(corrected: f64) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(3);
    for alt in [corrected / 2.0, corrected * 1.5, corrected * 2.0] {
        let alt = round_tenth(alt);
        let in_range = (MIN_ALTERNATE_BPM..=MAX_ALTERNATE_BPM).contains(&alt);
        if in_range && (alt - corrected).abs() > MIN_ALTERNATE_DISTANCE && !out.contains(&alt) {
            out.push(alt);
        }
    }
    out
}
