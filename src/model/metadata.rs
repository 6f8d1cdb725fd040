use super::{LoopBoundaries, TempoEstimate};
use serde::Serialize;

/// Where a reported frequency came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencySource {
    /// Parsed from the file name (e.g. `tone_7.83hz.wav`)
    Hint,

    /// Peak bin of the magnitude spectrum
    Spectrum,
}

/// Dominant frequency of a tone plus display values derived from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyInfo {
    /// Frequency in Hz, rounded to 0.1
    pub frequency: f64,

    pub source: FrequencySource,

    /// frequency x 60
    pub pulse_rate: f64,

    /// Pulse rate divided by 6, 8, 10 and 12
    pub bpm_suggestions: [f64; 4],
}

/// Everything the analysis phase learned about one input
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub frequency: Option<FrequencyInfo>,
    pub tempo: Option<TempoEstimate>,
    pub boundaries: Option<LoopBoundaries>,

    /// Signal duration in seconds
    pub duration: f64,
    pub sample_rate: u32,
    pub channel_count: usize,
}
