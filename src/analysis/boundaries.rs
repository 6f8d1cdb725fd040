//! Intro/outro cut-point detection for looping music

use crate::model::{LoopBoundaries, Signal};

/// RMS analysis chunk length in seconds
const CHUNK_SECONDS: f64 = 0.1;
/// Percentile of chunk RMS used as the loudness threshold
const THRESHOLD_PERCENTILE: f64 = 0.6;
/// Margin pushed into the loud region on each side, in seconds
const SAFETY_MARGIN: f64 = 10.0;

/// Find loop-safe intro end / outro start points.
///
/// The loop region is the span between the first and last chunk louder than
/// the 60th-percentile RMS, shrunk by a safety margin on both sides.
pub fn detect_boundaries(signal: &Signal) -> LoopBoundaries {
    let duration = signal.duration();
    let rms = chunk_rms(signal.first_channel(), signal.sample_rate());

    if rms.is_empty() {
        return LoopBoundaries::undetected(duration);
    }

    let mut sorted = rms.clone();
    sorted.sort_by(f64::total_cmp);
    let index = ((sorted.len() as f64 * THRESHOLD_PERCENTILE) as usize).min(sorted.len() - 1);
    let threshold = sorted[index];

    let (Some(first), Some(last)) = (
        rms.iter().position(|&r| r > threshold),
        rms.iter().rposition(|&r| r > threshold),
    ) else {
        log::debug!("No chunk exceeds the RMS threshold {:.4}", threshold);
        return LoopBoundaries::undetected(duration);
    };

    let intro_end = (first as f64 * CHUNK_SECONDS + SAFETY_MARGIN).min(duration);
    let outro_start = (last as f64 * CHUNK_SECONDS - SAFETY_MARGIN).max(0.0);

    if intro_end < outro_start && intro_end > 0.0 && outro_start < duration {
        log::info!(
            "Loop boundaries: intro ends {:.1}s, outro starts {:.1}s",
            intro_end,
            outro_start
        );
        LoopBoundaries {
            intro_end,
            outro_start,
            detected: true,
        }
    } else {
        log::info!("No safe loop region found in {:.1}s of music", duration);
        LoopBoundaries::undetected(duration)
    }
}

/// RMS of consecutive 100 ms chunks (the last chunk may be partial)
fn chunk_rms(samples: &[f32], sample_rate: u32) -> Vec<f64> {
    let chunk = ((sample_rate as f64 * CHUNK_SECONDS).round() as usize).max(1);
    samples
        .chunks(chunk)
        .map(|c| {
            let sum_sq: f64 = c.iter().map(|&s| (s as f64) * (s as f64)).sum();
            (sum_sq / c.len() as f64).sqrt()
        })
        .collect()
}
