//! Data model shared by every pipeline stage
//!
//! Signals are owned by whoever produced them (the decoder or the
//! stretcher) and borrowed read-only by analyzers and the renderer.

mod boundaries;
mod metadata;
mod signal;
mod tempo;

pub use boundaries::LoopBoundaries;
pub use metadata::{FrequencyInfo, FrequencySource, Metadata};
pub use signal::Signal;
pub use tempo::{AnalysisMode, Confidence, TempoEstimate};
