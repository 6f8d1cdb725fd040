use focusmix::encode::WAV_HEADER_SIZE;
use focusmix::render::{MixdownRenderer, MASTER_GAIN};
use focusmix::{render, Decoder, ExportFormat, LoopBoundaries, MixOptions, RenderError, Signal, SymphoniaDecoder};
use std::f32::consts::PI;
use tempfile::TempDir;

const RATE: u32 = 44100;

fn tone(freq: f32, seconds: f64, amp: f32) -> Signal {
    let len = (seconds * RATE as f64) as usize;
    let samples = (0..len)
        .map(|i| amp * (2.0 * PI * freq * i as f32 / RATE as f32).sin())
        .collect();
    Signal::mono(samples, RATE).unwrap()
}

/// Stereo music bed whose level never exceeds `amp`
fn music(seconds: f64, amp: f32) -> Signal {
    let left = tone(330.0, seconds, amp).first_channel().to_vec();
    let right = tone(220.0, seconds, amp).first_channel().to_vec();
    Signal::new(vec![left, right], RATE).unwrap()
}

fn options() -> MixOptions {
    MixOptions::new(70.0)
        .with_volumes(0.0, 0.0)
        .with_crossfade(3.0)
        .with_boundaries(5.0, 35.0)
}

#[test]
fn test_mix_has_exact_length_and_headroom() {
    let focus = tone(200.0, 30.0, 0.5);
    let music = music(40.0, 0.4);
    let boundaries = LoopBoundaries::manual(5.0, 35.0);

    let mix = MixdownRenderer::new(options())
        .render(&focus, &music, &boundaries)
        .unwrap();

    assert_eq!(mix.channel_count, 2);
    assert_eq!(mix.frames(), 70 * RATE as usize);
    assert!(mix.peak() <= MASTER_GAIN * 0.9 + 1e-4, "peak {}", mix.peak());
    assert!(mix.peak() > 0.1);
}

#[test]
fn test_render_writes_decodable_wav() {
    let focus = tone(200.0, 30.0, 0.5);
    let music = music(40.0, 0.4);

    let encoded = render(&focus, &music, &options(), |_| {}).unwrap();
    assert_eq!(encoded.media_type, "audio/wav");
    assert_eq!(encoded.bytes.len(), WAV_HEADER_SIZE + 70 * RATE as usize * 4);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join(format!("mix.{}", encoded.extension()));
    std::fs::write(&path, &encoded.bytes).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.duration(), 70 * RATE);

    let bytes = std::fs::read(&path).unwrap();
    let decoded = SymphoniaDecoder::new().decode(&bytes, Some("wav")).unwrap();
    assert_eq!(decoded.channel_count(), 2);
    assert_eq!(decoded.len(), 70 * RATE as usize);
}

#[test]
fn test_flac_request_keeps_wav_payload() {
    let focus = tone(200.0, 30.0, 0.5);
    let music = music(40.0, 0.4);
    let opts = options().with_format(ExportFormat::Flac);

    let encoded = render(&focus, &music, &opts, |_| {}).unwrap();
    assert_eq!(encoded.media_type, "audio/flac");
    assert_eq!(&encoded.bytes[0..4], b"RIFF");
    assert_eq!(&encoded.bytes[8..12], b"WAVE");
}

#[test]
fn test_short_mix_keeps_headroom() {
    let focus = tone(200.0, 30.0, 0.0);
    let music = music(40.0, 0.9);
    let boundaries = LoopBoundaries::manual(5.0, 35.0);

    for target in [6.0, 7.5, 8.0, 9.0, 10.5] {
        let opts = MixOptions::new(target)
            .with_volumes(0.0, 0.0)
            .with_crossfade(3.0)
            .with_boundaries(5.0, 35.0);
        let mix = MixdownRenderer::new(opts)
            .render(&focus, &music, &boundaries)
            .unwrap();
        assert!(
            mix.peak() <= MASTER_GAIN * 0.9 + 1e-4,
            "target {target}: peak {}",
            mix.peak()
        );
    }
}

#[test]
fn test_crossfade_longer_than_foundation_is_rejected() {
    let focus = tone(200.0, 2.0, 0.5);
    let music = music(40.0, 0.4);

    let err = render(&focus, &music, &options(), |_| {}).unwrap_err();
    assert!(matches!(err, RenderError::CrossfadeTooLong { .. }), "{err}");
}

#[test]
fn test_invalid_duration_is_rejected() {
    let focus = tone(200.0, 10.0, 0.5);
    let music = music(40.0, 0.4);
    let opts = options();
    let opts = MixOptions {
        target_duration_seconds: 0.0,
        ..opts
    };

    assert_eq!(
        render(&focus, &music, &opts, |_| {}).unwrap_err(),
        RenderError::InvalidDuration(0.0)
    );
}

#[test]
fn test_tempo_change_keeps_target_length() {
    let focus = tone(200.0, 10.0, 0.5);
    let music = music(20.0, 0.4);
    let opts = MixOptions::new(30.0)
        .with_crossfade(1.0)
        .with_boundaries(2.0, 18.0)
        .with_target_bpm(100.0)
        .with_source_bpm(120.0);

    let mut progress = Vec::new();
    let encoded = render(&focus, &music, &opts, |p| progress.push(p)).unwrap();

    assert_eq!(encoded.bytes.len(), WAV_HEADER_SIZE + 30 * RATE as usize * 4);
    assert_eq!(progress.first(), Some(&0));
    assert_eq!(progress.last(), Some(&100));
}
