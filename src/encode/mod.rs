//! Serialization of rendered mixes
//!
//! Only 16-bit PCM WAV is produced. Requesting FLAC or MP3 changes the
//! declared media type, never the payload.

mod wav;

pub use wav::{encode_wav, MAX_WAV_DATA_BYTES, WAV_HEADER_SIZE};

use crate::render::{ExportFormat, RenderedMix};

/// Encoded bytes plus the media type they are declared as
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAudio {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub format: ExportFormat,
}

impl EncodedAudio {
    /// File extension matching the payload actually written
    pub fn extension(&self) -> &'static str {
        "wav"
    }
}

impl ExportFormat {
    /// Media type label declared for this format
    pub fn media_type(&self) -> &'static str {
        match self {
            ExportFormat::Wav => "audio/wav",
            ExportFormat::Flac => "audio/flac",
            // Lossy encoding is not available; the WAV payload is labelled as such
            ExportFormat::Mp3 => "audio/wav",
        }
    }
}

/// Encode a mix for the requested format
pub fn encode(mix: &RenderedMix, format: ExportFormat) -> EncodedAudio {
    if format != ExportFormat::Wav {
        log::warn!(
            "{:?} export requested; writing 16-bit PCM WAV payload instead",
            format
        );
    }

    EncodedAudio {
        bytes: encode_wav(mix),
        media_type: format.media_type(),
        format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silence() -> RenderedMix {
        RenderedMix {
            samples: vec![0.0; 20],
            sample_rate: 44100,
            channel_count: 2,
        }
    }

    #[test]
    fn test_payload_is_wav_for_every_format() {
        for format in [ExportFormat::Wav, ExportFormat::Flac, ExportFormat::Mp3] {
            let out = encode(&silence(), format);
            assert_eq!(&out.bytes[0..4], b"RIFF");
            assert_eq!(out.extension(), "wav");
        }
    }

    #[test]
    fn test_media_types() {
        assert_eq!(encode(&silence(), ExportFormat::Wav).media_type, "audio/wav");
        assert_eq!(encode(&silence(), ExportFormat::Flac).media_type, "audio/flac");
        assert_eq!(encode(&silence(), ExportFormat::Mp3).media_type, "audio/wav");
    }
}
