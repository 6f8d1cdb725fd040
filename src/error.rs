//! Error types
//!
//! Decoding and rendering fail with distinct error types so callers can tell
//! a bad input file apart from a bad mix configuration. Analysis never fails;
//! it degrades to fallback values instead.

use thiserror::Error;

/// Errors raised when constructing a [`Signal`](crate::model::Signal)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("sample rate must be positive")]
    ZeroSampleRate,

    #[error("signal has no channels")]
    NoChannels,

    #[error("channel {channel} has {found} samples, expected {expected}")]
    RaggedChannels {
        channel: usize,
        expected: usize,
        found: usize,
    },

    #[error("non-finite sample in channel {channel} at index {index}")]
    NonFinite { channel: usize, index: usize },
}

/// Errors raised by a [`Decoder`](crate::decode::Decoder)
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported or unrecognized container: {0}")]
    Unsupported(String),

    #[error("corrupt audio stream: {0}")]
    Corrupt(String),

    #[error("no audio track found")]
    NoAudioTrack,

    #[error("audio stream contains no samples")]
    Empty,

    #[error("decoded audio is not a valid signal: {0}")]
    InvalidSignal(#[from] SignalError),
}

/// Configuration errors detected before a render starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("target duration must be positive and finite, got {0}")]
    InvalidDuration(f64),

    #[error("output sample rate must be positive")]
    InvalidSampleRate,

    #[error("a {seconds:.0}s mix exceeds the {max_seconds:.0}s a WAV file can hold at this rate")]
    OutputTooLong { seconds: f64, max_seconds: f64 },

    #[error("crossfade must be non-negative and finite, got {0}")]
    InvalidCrossfade(f64),

    #[error("crossfade of {crossfade:.3}s is not shorter than the {segment} segment ({duration:.3}s)")]
    CrossfadeTooLong {
        crossfade: f64,
        segment: &'static str,
        duration: f64,
    },

    #[error("invalid loop boundaries: intro end {intro_end:.3}s, outro start {outro_start:.3}s, duration {duration:.3}s")]
    InvalidBoundaries {
        intro_end: f64,
        outro_start: f64,
        duration: f64,
    },

    #[error("invalid tempo: {0}")]
    InvalidTempo(String),

    #[error("stretch rate must be positive and finite, got {0}")]
    InvalidRate(f64),
}
