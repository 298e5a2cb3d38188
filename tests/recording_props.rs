//! Property-Based Tests for the clipcam recording module
//!
//! These tests verify invariants and contracts of the recorder
//! using proptest for input generation and shrinking.
//!
//! Run with: cargo test --test recording_props

use clipcam::recording::{to_packed_rgb, ClipRecorder, RecordingSession};
use clipcam::testing::{synthetic_frame, FakeBackend, PacingLog, ScriptedSource, SyntheticLayout};
use clipcam::{RecordError, Resolution};
use image::DynamicImage;
use proptest::prelude::*;

// ═══════════════════════════════════════════════════════════════════════════
// FRAME COUNT INVARIANTS
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// INVARIANT: submissions == duration * fps
    #[test]
    fn submissions_match_duration_times_rate(
        duration in 1u32..6,
        fps in 1u32..12,
    ) {
        let backend = FakeBackend::new();
        let log = backend.log();
        let mut source = ScriptedSource::new(Resolution::new(16, 16));
        let session = RecordingSession::new("clip.mp4", duration, fps).unwrap();

        let stats = ClipRecorder::new(backend)
            .with_pacer(PacingLog::default())
            .record(&mut source, &session)
            .unwrap();

        let expected = u64::from(duration) * u64::from(fps);
        prop_assert_eq!(stats.frames_submitted, expected);
        prop_assert_eq!(log.snapshot().submitted_pts.len() as u64, expected);
        prop_assert_eq!(source.captures(), expected);
    }

    /// INVARIANT: flushing terminates and loses nothing, whatever the encoder holds back
    #[test]
    fn flush_terminates_for_any_delay(
        delay in 0usize..16,
        frames in 1u32..10,
    ) {
        let backend = FakeBackend::new().with_encoder_delay(delay);
        let log = backend.log();
        let mut source = ScriptedSource::new(Resolution::new(16, 16));
        let session = RecordingSession::new("clip.mp4", 1, frames).unwrap();

        let stats = ClipRecorder::new(backend)
            .with_pacer(PacingLog::default())
            .record(&mut source, &session)
            .unwrap();

        let log = log.snapshot();
        let held = delay.min(frames as usize) as u64;
        prop_assert_eq!(log.flush_calls, held + 1);
        prop_assert_eq!(stats.packets_written, u64::from(frames));
        prop_assert_eq!(log.written_pts, (0..i64::from(frames)).collect::<Vec<_>>());
    }

    /// INVARIANT: nothing is submitted after a capture failure
    #[test]
    fn no_submission_after_source_failure(
        fail_at in 1u64..20,
    ) {
        let backend = FakeBackend::new();
        let log = backend.log();
        let mut source = ScriptedSource::new(Resolution::new(16, 16)).fail_on_capture(fail_at);
        let session = RecordingSession::new("clip.mp4", 4, 5).unwrap();

        let result = ClipRecorder::new(backend)
            .with_pacer(PacingLog::default())
            .record(&mut source, &session);

        let is_source_error = matches!(result, Err(RecordError::SourceUnavailable(_)));
        prop_assert!(is_source_error);
        let log = log.snapshot();
        prop_assert_eq!(log.submitted_pts.len() as u64, fail_at - 1);
        prop_assert_eq!(log.containers_closed, 1);
        prop_assert_eq!(source.closes(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CONVERSION INVARIANTS
// ═══════════════════════════════════════════════════════════════════════════

fn layout_strategy() -> impl Strategy<Value = SyntheticLayout> {
    prop_oneof![
        Just(SyntheticLayout::Rgb8),
        Just(SyntheticLayout::Rgba8),
        Just(SyntheticLayout::Luma8),
    ]
}

proptest! {
    /// INVARIANT: normalizing twice equals normalizing once
    #[test]
    fn packed_rgb_is_idempotent(
        frame_number in 0u64..512,
        width in 1u32..48,
        height in 1u32..48,
        layout in layout_strategy(),
    ) {
        let image = layout.apply(synthetic_frame(frame_number, width, height));
        let once = to_packed_rgb(image);
        let twice = to_packed_rgb(DynamicImage::ImageRgb8(once.clone()));

        prop_assert_eq!(once.dimensions(), (width, height));
        prop_assert_eq!(once, twice);
    }

    /// INVARIANT: RGB8 input keeps its buffer
    #[test]
    fn packed_rgb_keeps_rgb8_buffer(
        width in 1u32..64,
        height in 1u32..64,
    ) {
        let frame = synthetic_frame(1, width, height);
        let ptr = frame.as_raw().as_ptr();
        let normalized = to_packed_rgb(DynamicImage::ImageRgb8(frame));
        prop_assert_eq!(normalized.as_raw().as_ptr(), ptr);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SESSION INVARIANTS
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// INVARIANT: frame count is the exact integer product, no float drift
    #[test]
    fn session_frame_count_exact(
        duration in 1u32..100_000,
        fps in 1u32..1_000,
    ) {
        let session = RecordingSession::new("clip.mp4", duration, fps).unwrap();
        prop_assert_eq!(session.frame_count(), u64::from(duration) * u64::from(fps));
        prop_assert_eq!(session.time_base().den, fps);
    }
}
