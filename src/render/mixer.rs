//! Buffer-level mixdown of the foundation and music tracks

use super::config::{db_to_gain, MixOptions};
use super::schedule::{schedule_foundation, schedule_music, Segment};
use crate::encode::MAX_WAV_DATA_BYTES;
use crate::error::RenderError;
use crate::model::{LoopBoundaries, Signal};

/// Fixed output gain leaving about 1 dB of headroom
pub const MASTER_GAIN: f32 = 0.89;
/// Channels in every rendered mix
pub const OUTPUT_CHANNELS: usize = 2;
/// Slack allowed when comparing boundaries against a track's duration
const BOUNDARY_TOLERANCE: f64 = 1e-6;

/// Interleaved stereo float PCM produced by [`MixdownRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMix {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channel_count: usize,
}

impl RenderedMix {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channel_count
    }

    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }
}

/// Schedules both sources as virtual tracks and sums them into one buffer
#[derive(Debug, Clone)]
pub struct MixdownRenderer {
    options: MixOptions,
}

impl MixdownRenderer {
    pub fn new(options: MixOptions) -> Self {
        Self { options }
    }

    /// Render `target_duration_seconds` of audio.
    ///
    /// `music` must already be stretched if a tempo change was requested,
    /// with `boundaries` on the same timeline.
    pub fn render(
        &self,
        focus: &Signal,
        music: &Signal,
        boundaries: &LoopBoundaries,
    ) -> Result<RenderedMix, RenderError> {
        self.validate(focus, music, boundaries)?;

        let opts = &self.options;
        let target = opts.target_duration_seconds;
        let crossfade = opts.crossfade_seconds;
        let sample_rate = opts.sample_rate;
        let frames = (target * sample_rate as f64).round() as usize;

        let focus_segments = schedule_foundation(
            focus.duration(),
            crossfade,
            target,
            db_to_gain(opts.focus_volume_db),
        );
        let music_segments = schedule_music(
            boundaries,
            music.duration(),
            crossfade,
            target,
            db_to_gain(opts.music_volume_db),
        );

        log::info!(
            "Rendering {:.1}s at {}Hz: {} foundation and {} music segment(s)",
            target,
            sample_rate,
            focus_segments.len(),
            music_segments.len()
        );

        let mut output = vec![0.0f32; frames * OUTPUT_CHANNELS];
        for segment in &focus_segments {
            mix_segment(&mut output, sample_rate, focus, segment);
        }
        for segment in &music_segments {
            mix_segment(&mut output, sample_rate, music, segment);
        }

        for s in output.iter_mut() {
            *s *= MASTER_GAIN;
        }

        Ok(RenderedMix {
            samples: output,
            sample_rate,
            channel_count: OUTPUT_CHANNELS,
        })
    }

    /// Reject configurations that would produce broken envelopes
    pub fn validate(
        &self,
        focus: &Signal,
        music: &Signal,
        boundaries: &LoopBoundaries,
    ) -> Result<(), RenderError> {
        let opts = &self.options;
        let target = opts.target_duration_seconds;
        let crossfade = opts.crossfade_seconds;

        if !target.is_finite() || target <= 0.0 {
            return Err(RenderError::InvalidDuration(target));
        }
        if opts.sample_rate == 0 {
            return Err(RenderError::InvalidSampleRate);
        }

        let bytes_per_second = opts.sample_rate as f64 * (OUTPUT_CHANNELS * 2) as f64;
        let max_seconds = MAX_WAV_DATA_BYTES as f64 / bytes_per_second;
        let frames = (target * opts.sample_rate as f64).round();
        if frames * (OUTPUT_CHANNELS * 2) as f64 > MAX_WAV_DATA_BYTES as f64 {
            return Err(RenderError::OutputTooLong {
                seconds: target,
                max_seconds,
            });
        }
        if !crossfade.is_finite() || crossfade < 0.0 {
            return Err(RenderError::InvalidCrossfade(crossfade));
        }

        let duration = music.duration();
        if boundaries.intro_end < 0.0
            || boundaries.outro_start <= boundaries.intro_end
            || boundaries.outro_start > duration + BOUNDARY_TOLERANCE
        {
            return Err(RenderError::InvalidBoundaries {
                intro_end: boundaries.intro_end,
                outro_start: boundaries.outro_start,
                duration,
            });
        }

        let intro = boundaries.intro_end;
        let outro = (duration - boundaries.outro_start).max(0.0);
        let mut segments = vec![
            ("foundation", focus.duration()),
            ("music loop", boundaries.loop_duration()),
        ];
        if intro > 0.0 {
            segments.push(("intro", intro));
        }
        if outro > BOUNDARY_TOLERANCE {
            segments.push(("outro", outro));
        }

        for (segment, seg_duration) in segments {
            if crossfade >= seg_duration {
                return Err(RenderError::CrossfadeTooLong {
                    crossfade,
                    segment,
                    duration: seg_duration,
                });
            }
        }
        Ok(())
    }
}

/// Add one segment of `source` into the interleaved stereo `output`
fn mix_segment(output: &mut [f32], sample_rate: u32, source: &Signal, segment: &Segment) {
    let total_frames = output.len() / OUTPUT_CHANNELS;
    let rate = sample_rate as f64;
    let first = ((segment.start.max(0.0) * rate).ceil() as usize).min(total_frames);
    let last = ((segment.end() * rate).ceil() as usize).min(total_frames);

    let src_rate = source.sample_rate() as f64;
    let src_len = source.len();
    let last_src_channel = source.channel_count() - 1;

    for frame in first..last {
        let t = frame as f64 / rate;
        let gain = segment.envelope.at(t) as f32;
        if gain == 0.0 {
            continue;
        }

        let pos = (segment.source_offset + (t - segment.start)) * src_rate;
        let index = pos.floor() as usize;
        if index >= src_len {
            continue;
        }
        let frac = (pos - index as f64) as f32;

        for ch in 0..OUTPUT_CHANNELS {
            let data = source.channel(ch.min(last_src_channel));
            let a = data[index];
            let b = data.get(index + 1).copied().unwrap_or(a);
            output[frame * OUTPUT_CHANNELS + ch] += (a + (b - a) * frac) * gain;
        }
    }
}
