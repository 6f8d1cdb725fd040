//! Analysis entrypoint: frequency, tempo and loop boundaries for one input

use super::aggregate::aggregate_tempo;
use super::boundaries::detect_boundaries;
use super::frequency::FrequencyAnalyzer;
use super::tempo::{AutocorrelationEstimator, PeakClusterEstimator, TempoEstimator};
use crate::model::{AnalysisMode, Metadata, Signal, TempoEstimate};
use serde::{Deserialize, Serialize};

/// Signals longer than this are not treated as loopable music beds
pub const MAX_TEMPO_ANALYSIS_SECONDS: f64 = 600.0;

/// Which side of the mix an input feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRole {
    /// Looping ambience/tone bed
    Foundation,

    /// Overlay music with intro/loop/outro
    #[default]
    Music,
}

/// Per-input analysis settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub mode: AnalysisMode,
    pub role: SourceRole,

    /// Original file name, searched for a frequency hint
    pub file_name: Option<String>,
}

impl AnalysisOptions {
    pub fn new(role: SourceRole) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// Analyze one decoded input.
///
/// Never fails: every stage degrades to "no result" instead. `on_status`
/// receives a short human-readable message before each stage.
pub fn analyze(
    signal: &Signal,
    options: &AnalysisOptions,
    mut on_status: impl FnMut(&str),
) -> Metadata {
    log::debug!(
        "Analyzing {:.1}s signal ({:?}, {} mode)",
        signal.duration(),
        options.role,
        options.mode.name()
    );

    on_status("Detecting frequency");
    let frequency = FrequencyAnalyzer::new().analyze(signal, options.file_name.as_deref());

    let tempo = if signal.duration() > MAX_TEMPO_ANALYSIS_SECONDS {
        log::warn!(
            "Skipping tempo analysis: {:.0}s exceeds {:.0}s",
            signal.duration(),
            MAX_TEMPO_ANALYSIS_SECONDS
        );
        None
    } else {
        on_status(match options.mode {
            AnalysisMode::Fast => "Estimating tempo",
            AnalysisMode::Accurate => "Running accurate tempo analysis",
        });
        Some(estimate_tempo(signal, options.mode))
    };

    let boundaries = match options.role {
        SourceRole::Music => {
            on_status("Finding loop points");
            Some(detect_boundaries(signal))
        }
        SourceRole::Foundation => None,
    };

    on_status("Analysis complete");

    Metadata {
        frequency,
        tempo,
        boundaries,
        duration: signal.duration(),
        sample_rate: signal.sample_rate(),
        channel_count: signal.channel_count(),
    }
}

/// Run the estimator selected by `mode` and aggregate its passes
pub fn estimate_tempo(signal: &Signal, mode: AnalysisMode) -> TempoEstimate {
    let estimator: Box<dyn TempoEstimator> = match mode {
        AnalysisMode::Fast => Box::new(PeakClusterEstimator::new()),
        AnalysisMode::Accurate => Box::new(AutocorrelationEstimator::new()),
    };

    let passes = estimator.estimate(signal);
    aggregate_tempo(&passes, mode, vec![estimator.name().to_string()])
}
