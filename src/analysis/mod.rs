//! Audio analysis layer
//!
//! Frequency detection for the foundation tone, tempo estimation with
//! robust aggregation, and loop-boundary detection for the music track.
//! Everything here is a pure function of an immutable [`Signal`](crate::model::Signal).

mod aggregate;
mod analyzer;
mod boundaries;
mod frequency;
mod tempo;

pub use aggregate::{aggregate_tempo, octave_correct};
pub use analyzer::{analyze, estimate_tempo, AnalysisOptions, SourceRole, MAX_TEMPO_ANALYSIS_SECONDS};
pub use boundaries::detect_boundaries;
pub use frequency::{parse_frequency_hint, FrequencyAnalyzer};
pub use tempo::{AutocorrelationEstimator, PeakClusterEstimator, TempoEstimator, PEAK_HOP_SIZES};

/// Round to one decimal place
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
