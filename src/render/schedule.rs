//! Placement of source segments on the output timeline
//!
//! Both tracks are described as a list of [`Segment`]s: a slice of source
//! material, where it starts in the output, and the gain automation it
//! plays with. The mixer only has to sum them.

use super::envelope::GainEnvelope;
use crate::model::LoopBoundaries;

/// Role of a scheduled segment, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Foundation,
    Intro,
    Loop,
    Outro,
}

/// One scheduled slice of a source buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,

    /// Output time (seconds) at which the slice starts playing
    pub start: f64,

    /// Source time (seconds) of the slice's first sample
    pub source_offset: f64,

    /// Gain automation; also bounds where the segment is audible
    pub envelope: GainEnvelope,
}

impl Segment {
    /// Output time at which the segment stops contributing
    pub fn end(&self) -> f64 {
        self.envelope.end
    }
}

/// Loop the whole foundation buffer until `target`.
///
/// Copies overlap by one crossfade. The first copy starts at full gain;
/// every later copy fades in. Each copy fades out before its natural end,
/// or before `target` if it is cut short.
pub fn schedule_foundation(duration: f64, crossfade: f64, target: f64, gain: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut start = 0.0;

    while start < target {
        let end = (start + duration).min(target);
        let mut envelope = GainEnvelope::constant(gain, start, end).with_fade_out(crossfade);
        if !segments.is_empty() {
            envelope = envelope.with_fade_in(crossfade);
        }

        segments.push(Segment {
            kind: SegmentKind::Foundation,
            start,
            source_offset: 0.0,
            envelope,
        });
        start += duration - crossfade;
    }

    segments
}

/// Lay out the music as intro, repeated loop region and outro.
///
/// `boundaries` and `duration` are on the (possibly stretched) music
/// timeline. The outro is anchored so that it runs until `target`; loop
/// repetitions fill the time between the intro and the outro, the last one
/// cut (or extended into the source's outro) so it ends one crossfade after
/// the outro begins. When there is less than a crossfade of room between
/// the intro and the outro, the loop is skipped and the outro crossfades
/// directly out of the intro. Without an intro the first repetition starts
/// at full gain; without an outro the last repetition fades out at `target`.
pub fn schedule_music(
    boundaries: &LoopBoundaries,
    duration: f64,
    crossfade: f64,
    target: f64,
    gain: f64,
) -> Vec<Segment> {
    let intro_len = boundaries.intro_end;
    let loop_len = boundaries.loop_duration();
    let outro_len = duration - boundaries.outro_start;

    let mut segments = Vec::new();
    let mut cursor = 0.0;

    if intro_len > 0.0 {
        let envelope = GainEnvelope::constant(gain, 0.0, intro_len.min(target))
            .with_fade_out(crossfade);
        segments.push(Segment {
            kind: SegmentKind::Intro,
            start: 0.0,
            source_offset: 0.0,
            envelope,
        });
        cursor = intro_len - crossfade;
    }

    let mut outro_at = if outro_len > 0.0 {
        (target - outro_len).max(cursor)
    } else {
        target
    };

    // A repetition squeezed between the intro and outro fades would overlap both
    if intro_len > 0.0 && outro_len > 0.0 && outro_at - cursor < crossfade {
        outro_at = cursor;
    }

    while cursor < outro_at {
        // The repetition that reaches the outro runs on through its crossfade
        let last = cursor + loop_len >= outro_at;
        let end = if last { outro_at + crossfade } else { cursor + loop_len }.min(target);
        let mut envelope = GainEnvelope::constant(gain, cursor, end).with_fade_out(crossfade);
        if !segments.is_empty() {
            envelope = envelope.with_fade_in(crossfade);
        }

        segments.push(Segment {
            kind: SegmentKind::Loop,
            start: cursor,
            source_offset: boundaries.intro_end,
            envelope,
        });
        if last {
            break;
        }
        cursor += loop_len - crossfade;
    }

    if outro_len > 0.0 && outro_at < target {
        let end = (outro_at + outro_len).min(target);
        let mut envelope = GainEnvelope::constant(gain, outro_at, end);
        if !segments.is_empty() {
            envelope = envelope.with_fade_in(crossfade);
        }

        segments.push(Segment {
            kind: SegmentKind::Outro,
            start: outro_at,
            source_offset: boundaries.outro_start,
            envelope,
        });
    }

    log::debug!(
        "Music schedule: {} segment(s) over {:.1}s",
        segments.len(),
        target
    );
    segments
}
