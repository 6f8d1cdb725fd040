//! focusmix - foundation + music mixdown renderer
//!
//! This library analyzes a looping foundation tone and an overlay music
//! track, optionally retimes the music to a target tempo, and renders a
//! fixed-length stereo mix encoded as 16-bit PCM WAV.

pub mod analysis;
pub mod decode;
pub mod encode;
pub mod error;
pub mod model;
pub mod render;
pub mod stretch;
pub mod window;

pub use analysis::{analyze, AnalysisOptions, SourceRole};
pub use decode::{Decoder, SymphoniaDecoder};
pub use encode::EncodedAudio;
pub use error::{DecodeError, RenderError, SignalError};
pub use model::{AnalysisMode, LoopBoundaries, Metadata, Signal, TempoEstimate};
pub use render::{render, ExportFormat, MixOptions};
