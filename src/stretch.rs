//! Pitch-preserving duration change by grain overlap-add
//!
//! Fixed 60 ms Hann grains are read from the input at `out_pos * rate` and
//! summed into the output at a 50% overlap. There is no phase or transient
//! tracking, so quality drops at extreme rates.

use crate::error::RenderError;
use crate::model::Signal;
use crate::window::hann_window;
use std::borrow::Cow;

/// Rates this close to 1.0 are passed through untouched
pub const RATE_EPSILON: f64 = 0.01;
/// Grain length in seconds
const GRAIN_SECONDS: f64 = 0.06;
/// Fraction of a grain shared with its neighbour
const OVERLAP: f64 = 0.5;

/// Stretch `signal` so its duration becomes `duration / rate`.
///
/// `rate > 1` shortens, `rate < 1` lengthens. Near-unity rates return the
/// input borrowed as-is.
pub fn stretch(signal: &Signal, rate: f64) -> Result<Cow<'_, Signal>, RenderError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(RenderError::InvalidRate(rate));
    }
    if (rate - 1.0).abs() < RATE_EPSILON {
        log::debug!("Stretch rate {:.4} is within tolerance, skipping", rate);
        return Ok(Cow::Borrowed(signal));
    }

    let grain = ((GRAIN_SECONDS * signal.sample_rate() as f64).round() as usize).max(2);
    let hop = ((grain as f64 * (1.0 - OVERLAP)) as usize).max(1);
    let window = hann_window(grain);

    let channels = signal
        .channels()
        .iter()
        .map(|input| stretch_channel(input, rate, &window, hop))
        .collect();

    let stretched = Signal::new(channels, signal.sample_rate())
        .map_err(|_| RenderError::InvalidRate(rate))?;

    log::info!(
        "Stretched {:.2}s -> {:.2}s (rate {:.4})",
        signal.duration(),
        stretched.duration(),
        rate
    );
    Ok(Cow::Owned(stretched))
}

fn stretch_channel(input: &[f32], rate: f64, window: &[f32], hop: usize) -> Vec<f32> {
    let grain = window.len();
    let out_len = (input.len() as f64 / rate) as usize;
    let mut output = vec![0.0f32; out_len];

    let mut out_pos = 0;
    while out_pos < out_len {
        let in_pos = (out_pos as f64 * rate) as usize;
        if in_pos + grain > input.len() {
            break;
        }

        let dest = &mut output[out_pos..(out_pos + grain).min(out_len)];
        for ((o, &s), &w) in dest.iter_mut().zip(&input[in_pos..]).zip(window) {
            *o += s * w;
        }
        out_pos += hop;
    }

    output
}
