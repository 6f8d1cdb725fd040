//! Mix configuration

use crate::model::LoopBoundaries;
use serde::{Deserialize, Serialize};

/// Container format requested for the rendered mix.
///
/// The payload is always 16-bit PCM WAV; the format only selects the
/// declared media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Wav,
    Flac,
    Mp3,
}

/// Caller-supplied mix settings, read-only to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixOptions {
    /// Length of the rendered mix in seconds
    pub target_duration_seconds: f64,

    /// Music track level in dB
    pub music_volume_db: f64,

    /// Foundation track level in dB
    pub focus_volume_db: f64,

    /// Length of every crossfade in seconds
    pub crossfade_seconds: f64,

    pub export_format: ExportFormat,

    /// Stretch the music to this tempo
    pub target_bpm: Option<f64>,

    /// Source tempo to use instead of the detected one
    pub source_bpm_override: Option<f64>,

    /// Loop points in unstretched music time, replacing detection
    pub manual_boundaries: Option<LoopBoundaries>,

    /// Output sample rate in Hz
    pub sample_rate: u32,
}

impl Default for MixOptions {
    fn default() -> Self {
        Self {
            target_duration_seconds: 3600.0,
            music_volume_db: -6.0,
            focus_volume_db: 0.0,
            crossfade_seconds: 3.0,
            export_format: ExportFormat::Wav,
            target_bpm: None,
            source_bpm_override: None,
            manual_boundaries: None,
            sample_rate: 44100,
        }
    }
}

impl MixOptions {
    pub fn new(target_duration_seconds: f64) -> Self {
        Self {
            target_duration_seconds,
            ..Self::default()
        }
    }

    pub fn with_volumes(mut self, music_db: f64, focus_db: f64) -> Self {
        self.music_volume_db = music_db;
        self.focus_volume_db = focus_db;
        self
    }

    pub fn with_crossfade(mut self, seconds: f64) -> Self {
        self.crossfade_seconds = seconds;
        self
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.export_format = format;
        self
    }

    pub fn with_target_bpm(mut self, bpm: f64) -> Self {
        self.target_bpm = Some(bpm);
        self
    }

    pub fn with_source_bpm(mut self, bpm: f64) -> Self {
        self.source_bpm_override = Some(bpm);
        self
    }

    pub fn with_boundaries(mut self, intro_end: f64, outro_start: f64) -> Self {
        self.manual_boundaries = Some(LoopBoundaries::manual(intro_end, outro_start));
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

/// Linear gain for a level in dB
pub fn db_to_gain(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}
