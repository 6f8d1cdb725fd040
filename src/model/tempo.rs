use serde::{Deserialize, Serialize};

/// Tempo to report when no estimator produced a usable candidate
pub const FALLBACK_BPM: f64 = 120.0;

/// Which tempo estimator to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Multi-pass peak clustering
    #[default]
    Fast,

    /// Onset-envelope autocorrelation
    Accurate,
}

impl AnalysisMode {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisMode::Fast => "fast",
            AnalysisMode::Accurate => "accurate",
        }
    }
}

/// Confidence grade for a tempo estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Aggregated tempo estimate for one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoEstimate {
    /// Median of the filtered passes before octave correction
    pub raw: f64,

    /// Octave-corrected tempo in [60, 200]
    pub corrected: f64,

    /// Alternate half/one-and-a-half/double tempo readings
    pub candidates: Vec<f64>,

    /// Population standard deviation of the filtered passes
    pub std_dev: f64,

    pub confidence: Confidence,

    /// Names of the estimators that contributed passes
    pub algorithms_used: Vec<String>,

    /// Every raw candidate, in the order produced
    pub all_passes: Vec<f64>,

    /// Candidates that survived outlier filtering, sorted
    pub filtered_passes: Vec<f64>,

    pub mode_used: AnalysisMode,
}

impl TempoEstimate {
    /// Estimate reported when no pass produced a candidate
    pub fn fallback(mode: AnalysisMode, algorithms_used: Vec<String>) -> Self {
        Self {
            raw: FALLBACK_BPM,
            corrected: FALLBACK_BPM,
            candidates: Vec::new(),
            std_dev: 0.0,
            confidence: Confidence::Low,
            algorithms_used,
            all_passes: Vec::new(),
            filtered_passes: Vec::new(),
            mode_used: mode,
        }
    }
}
