//! Decoding compressed and container audio into planar signals
//!
//! The pipeline only depends on the [`Decoder`] trait; [`SymphoniaDecoder`]
//! is the implementation the CLI uses.

mod symphonia_decoder;

pub use symphonia_decoder::SymphoniaDecoder;

use crate::error::DecodeError;
use crate::model::Signal;

/// Turns encoded bytes into a [`Signal`]
pub trait Decoder {
    /// Decode a complete file held in memory.
    ///
    /// `extension` is an optional file-extension hint (e.g. `"flac"`).
    fn decode(&self, bytes: &[u8], extension: Option<&str>) -> Result<Signal, DecodeError>;
}
