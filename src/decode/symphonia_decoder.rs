//! Decoder built on symphonia's probe and codec registries

use super::Decoder;
use crate::error::DecodeError;
use crate::model::Signal;
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decodes every container/codec enabled in symphonia's default registry
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8], extension: Option<&str>) -> Result<Signal, DecodeError> {
        log::debug!("Decoding {} bytes (hint: {:?})", bytes.len(), extension);

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let format_opts = FormatOptions::default();
        let metadata_opts = MetadataOptions::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &format_opts, &metadata_opts)
            .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

        let mut format = probed.format;

        // Find the first audio track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoAudioTrack)?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channel_count = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

        let dec_opts = DecoderOptions::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &dec_opts)
            .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

        let mut interleaved: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break; // End of stream
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Skipping undecodable packet: {}", e);
                    continue;
                }
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };

            let spec = *decoded.spec();
            sample_rate = spec.rate;
            channel_count = spec.channels.count();

            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(sample_buf.samples());
        }

        if interleaved.is_empty() || channel_count == 0 {
            return Err(DecodeError::Empty);
        }

        let signal = Signal::from_interleaved(&interleaved, channel_count, sample_rate)?;

        log::debug!(
            "Decoded {} frames ({:.1}s) at {}Hz, {} channel(s)",
            signal.len(),
            signal.duration(),
            signal.sample_rate(),
            signal.channel_count()
        );

        Ok(signal)
    }
}
