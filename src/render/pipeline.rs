//! Render entrypoint: boundaries, optional tempo change, mixdown, encoding

use super::config::MixOptions;
use super::mixer::MixdownRenderer;
use crate::analysis::{detect_boundaries, estimate_tempo, MAX_TEMPO_ANALYSIS_SECONDS};
use crate::encode::{encode, EncodedAudio};
use crate::error::RenderError;
use crate::model::{AnalysisMode, LoopBoundaries, Signal};
use crate::stretch::stretch;
use std::borrow::Cow;

/// Render a complete mix and encode it.
///
/// `on_progress` receives non-decreasing milestones from 0 to 100. The call
/// runs to completion; there is no partial result.
pub fn render(
    focus: &Signal,
    music: &Signal,
    options: &MixOptions,
    mut on_progress: impl FnMut(u8),
) -> Result<EncodedAudio, RenderError> {
    log::info!("Starting mixdown");
    on_progress(0);

    let boundaries = resolve_boundaries(music, options)?;
    let rate = stretch_rate(music, options)?;
    on_progress(10);

    let (stretched, boundaries) = retime(music, &boundaries, rate)?;
    on_progress(25);

    let mix = MixdownRenderer::new(options.clone()).render(focus, &stretched, &boundaries)?;
    on_progress(85);

    let encoded = encode(&mix, options.export_format);
    log::info!(
        "Mixdown complete: {:.1}s, {} bytes ({})",
        mix.duration(),
        encoded.bytes.len(),
        encoded.media_type
    );
    on_progress(100);

    Ok(encoded)
}

/// Stretch the music and move its boundaries onto the stretched timeline
fn retime<'a>(
    music: &'a Signal,
    boundaries: &LoopBoundaries,
    rate: f64,
) -> Result<(Cow<'a, Signal>, LoopBoundaries), RenderError> {
    let stretched = stretch(music, rate)?;
    let boundaries = if boundaries.detected {
        let scaled = boundaries.scaled(rate);
        LoopBoundaries {
            outro_start: scaled.outro_start.min(stretched.duration()),
            ..scaled
        }
    } else {
        LoopBoundaries::undetected(stretched.duration())
    };
    Ok((stretched, boundaries))
}

/// Supplied boundaries if present and valid, otherwise detected ones
fn resolve_boundaries(music: &Signal, options: &MixOptions) -> Result<LoopBoundaries, RenderError> {
    let Some(manual) = options.manual_boundaries else {
        return Ok(detect_boundaries(music));
    };

    let duration = music.duration();
    if manual.intro_end < 0.0 || manual.intro_end >= manual.outro_start || manual.outro_start > duration {
        return Err(RenderError::InvalidBoundaries {
            intro_end: manual.intro_end,
            outro_start: manual.outro_start,
            duration,
        });
    }

    log::info!(
        "Using supplied loop boundaries: {:.1}s - {:.1}s",
        manual.intro_end,
        manual.outro_start
    );
    Ok(manual)
}

/// Playback-rate factor that moves the music to `target_bpm`
fn stretch_rate(music: &Signal, options: &MixOptions) -> Result<f64, RenderError> {
    let Some(target_bpm) = options.target_bpm else {
        return Ok(1.0);
    };
    check_bpm("target", target_bpm)?;

    let source_bpm = match options.source_bpm_override {
        Some(bpm) => {
            check_bpm("source override", bpm)?;
            bpm
        }
        None if music.duration() > MAX_TEMPO_ANALYSIS_SECONDS => {
            return Err(RenderError::InvalidTempo(format!(
                "music is {:.0}s long (over {:.0}s); a source BPM is required to retime it",
                music.duration(),
                MAX_TEMPO_ANALYSIS_SECONDS
            )));
        }
        None => estimate_tempo(music, AnalysisMode::Fast).corrected,
    };

    let rate = target_bpm / source_bpm;
    log::info!(
        "Tempo change {:.1} -> {:.1} BPM (rate {:.4})",
        source_bpm,
        target_bpm,
        rate
    );
    Ok(rate)
}

fn check_bpm(label: &str, bpm: f64) -> Result<(), RenderError> {
    if bpm.is_finite() && bpm > 0.0 {
        Ok(())
    } else {
        Err(RenderError::InvalidTempo(format!("{} BPM must be positive, got {}", label, bpm)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::schedule::{schedule_music, SegmentKind};

    fn tone(seconds: f64, rate: u32) -> Signal {
        Signal::mono(vec![0.3; (seconds * rate as f64) as usize], rate).unwrap()
    }

    #[test]
    fn test_manual_boundaries_are_validated() {
        let music = tone(10.0, 1000);
        let opts = MixOptions::new(20.0).with_boundaries(4.0, 12.0);
        assert!(matches!(
            resolve_boundaries(&music, &opts),
            Err(RenderError::InvalidBoundaries { .. })
        ));
    }

    #[test]
    fn test_rate_from_override() {
        let music = tone(10.0, 1000);
        let opts = MixOptions::new(20.0).with_target_bpm(150.0).with_source_bpm(120.0);
        assert!((stretch_rate(&music, &opts).unwrap() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_no_target_means_no_stretch() {
        let music = tone(10.0, 1000);
        assert_eq!(stretch_rate(&music, &MixOptions::new(20.0)).unwrap(), 1.0);
    }

    #[test]
    fn test_invalid_bpm_is_rejected() {
        let music = tone(10.0, 1000);
        let opts = MixOptions::new(20.0).with_target_bpm(-5.0);
        assert!(matches!(
            stretch_rate(&music, &opts),
            Err(RenderError::InvalidTempo(_))
        ));
    }

    #[test]
    fn test_long_music_needs_source_bpm_to_retime() {
        let music = Signal::mono(vec![0.3; 100 * 601], 100).unwrap();
        let opts = MixOptions::new(20.0).with_target_bpm(100.0);
        assert!(matches!(
            stretch_rate(&music, &opts),
            Err(RenderError::InvalidTempo(_))
        ));

        let opts = opts.with_source_bpm(120.0);
        assert!((stretch_rate(&music, &opts).unwrap() - 100.0 / 120.0).abs() < 1e-12);
    }

    #[test]
    fn test_half_speed_doubles_boundaries() {
        let music = tone(20.0, 1000);
        let opts = MixOptions::new(60.0)
            .with_boundaries(4.0, 16.0)
            .with_source_bpm(120.0)
            .with_target_bpm(60.0);

        let boundaries = resolve_boundaries(&music, &opts).unwrap();
        let rate = stretch_rate(&music, &opts).unwrap();
        assert_eq!(rate, 0.5);

        let (stretched, scaled) = retime(&music, &boundaries, rate).unwrap();
        assert!((stretched.duration() - 40.0).abs() < 1e-9);
        assert!((scaled.intro_end - 8.0).abs() < 1e-9);
        assert!((scaled.outro_start - 32.0).abs() < 1e-9);
        assert!(scaled.detected);

        // The intro -> loop seam lands one crossfade before the scaled intro end
        let segs = schedule_music(&scaled, stretched.duration(), 3.0, 60.0, 1.0);
        assert_eq!(segs[1].kind, SegmentKind::Loop);
        assert!((segs[1].start - 5.0).abs() < 1e-9);
        assert!((segs[1].source_offset - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_undetected_boundaries_span_stretched_track() {
        let music = tone(20.0, 1000);
        let (stretched, scaled) = retime(&music, &LoopBoundaries::undetected(20.0), 2.0).unwrap();
        assert!((stretched.duration() - 10.0).abs() < 1e-9);
        assert_eq!(scaled, LoopBoundaries::undetected(stretched.duration()));
    }

    #[test]
    fn test_supplied_undetected_boundaries_are_kept() {
        let music = tone(10.0, 1000);
        let opts = MixOptions {
            manual_boundaries: Some(LoopBoundaries::undetected(10.0)),
            ..MixOptions::new(20.0)
        };
        assert!(!resolve_boundaries(&music, &opts).unwrap().detected);
    }

    #[test]
    fn test_progress_is_monotonic_and_completes() {
        let focus = tone(8.0, 1000);
        let music = tone(12.0, 1000);
        let opts = MixOptions::new(30.0)
            .with_crossfade(1.0)
            .with_boundaries(3.0, 9.0)
            .with_sample_rate(1000);

        let mut seen = Vec::new();
        render(&focus, &music, &opts, |p| seen.push(p)).unwrap();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100));
    }

    #[test]
    fn test_stretched_render_keeps_length() {
        let focus = tone(8.0, 1000);
        let music = tone(12.0, 1000);
        let opts = MixOptions::new(30.0)
            .with_crossfade(1.0)
            .with_boundaries(3.0, 9.0)
            .with_target_bpm(132.0)
            .with_source_bpm(120.0)
            .with_sample_rate(1000);

        let out = render(&focus, &music, &opts, |_| {}).unwrap();
        assert_eq!(out.bytes.len(), 44 + 30_000 * 4);
    }
}
