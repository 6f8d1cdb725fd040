//! Canonical 44-byte-header PCM16 RIFF/WAVE writer

use crate::render::RenderedMix;

/// Size of the RIFF + fmt + data chunk headers
pub const WAV_HEADER_SIZE: usize = 44;
/// Largest data chunk whose RIFF size (`36 + data`) still fits in 32 bits
pub const MAX_WAV_DATA_BYTES: u64 = u32::MAX as u64 - 36;
/// `fmt ` chunk audio format code for integer PCM
const WAV_FORMAT_PCM: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Encode an interleaved mix as 16-bit little-endian PCM WAV.
///
/// Samples are clamped to [-1, 1]; negative values scale by 32768 and
/// positive values by 32767.
pub fn encode_wav(mix: &RenderedMix) -> Vec<u8> {
    let channels = mix.channel_count as u16;
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = mix.sample_rate * block_align as u32;
    let data_bytes = mix.frames() as u64 * block_align as u64;
    if data_bytes > MAX_WAV_DATA_BYTES {
        log::warn!("{} bytes of PCM overflow the WAV size fields", data_bytes);
    }
    let data_size = data_bytes.min(MAX_WAV_DATA_BYTES) as u32;

    let mut out = Vec::with_capacity(WAV_HEADER_SIZE + data_size as usize);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&WAV_FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&mix.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());

    let whole_frames = mix.frames() * mix.channel_count;
    for &sample in &mix.samples[..whole_frames] {
        out.extend_from_slice(&quantize(sample).to_le_bytes());
    }

    out
}

/// Convert a float sample to a 16-bit integer
fn quantize(sample: f32) -> i16 {
    let s = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}
