//! Mixdown rendering
//!
//! The foundation loops for the whole mix while the music plays
//! intro -> loop -> outro, both built from scheduled segments with gain
//! envelopes and summed into a fixed-length stereo buffer.

pub mod config;
mod envelope;
mod mixer;
mod pipeline;
mod schedule;

pub use config::{db_to_gain, ExportFormat, MixOptions};
pub use envelope::GainEnvelope;
pub use mixer::{MixdownRenderer, RenderedMix, MASTER_GAIN, OUTPUT_CHANNELS};
pub use pipeline::render;
pub use schedule::{schedule_foundation, schedule_music, Segment, SegmentKind};
