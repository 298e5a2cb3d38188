//! Contract tests for ClipRecorder against scripted sources and backends
//!
//! Run with: cargo test --test recorder_contract

use clipcam::recording::{ClipRecorder, PixelFormat, Rational, RecordingSession};
use clipcam::testing::{FakeBackend, PacingLog, ScriptedSource};
use clipcam::{RecordError, Resolution};

fn recorder(backend: FakeBackend) -> ClipRecorder<FakeBackend, PacingLog> {
    ClipRecorder::new(backend).with_pacer(PacingLog::default())
}

#[test]
fn vga_source_two_seconds_at_five_fps() {
    let backend = FakeBackend::new();
    let log = backend.log();
    let mut source = ScriptedSource::new(Resolution::new(640, 480));
    let session = RecordingSession::new("clip.mp4", 2, 5).unwrap();

    let stats = recorder(backend).record(&mut source, &session).unwrap();

    let log = log.snapshot();
    let params = log.encoder_params.expect("encoder configured");
    assert_eq!(params.width, 640);
    assert_eq!(params.height, 480);
    assert_eq!(params.pixel_format, PixelFormat::Yuv420p);
    assert_eq!(params.time_base, Rational::new(1, 5));
    assert_eq!(log.submitted_pts.len(), 10);
    assert_eq!(log.flush_calls, 1);
    assert_eq!(stats.frames_submitted, 10);
}

#[test]
fn source_failure_on_third_of_ten_frames() {
    let backend = FakeBackend::new();
    let log = backend.log();
    let mut source = ScriptedSource::new(Resolution::new(64, 48)).fail_on_capture(3);
    let session = RecordingSession::new("clip.mp4", 2, 5).unwrap();

    let result = recorder(backend).record(&mut source, &session);

    assert!(matches!(result, Err(RecordError::SourceUnavailable(_))));
    assert_eq!(source.captures(), 3);
    assert_eq!(source.closes(), 1);
    assert!(!source.is_open());

    let log = log.snapshot();
    assert_eq!(log.containers_opened, 1);
    assert_eq!(log.containers_closed, 1);
    assert_eq!(log.submitted_pts, vec![0, 1]);
    assert_eq!(log.flush_calls, 0);
}

#[test]
fn container_init_failure_never_captures() {
    let backend = FakeBackend::new().fail_container_init();
    let log = backend.log();
    let mut source = ScriptedSource::new(Resolution::VGA);
    let session = RecordingSession::new("/nonexistent/dir/clip.mp4", 10, 20).unwrap();

    let result = recorder(backend).record(&mut source, &session);

    assert!(matches!(result, Err(RecordError::PipelineInitFailed(_))));
    assert_eq!(source.captures(), 0);
    assert_eq!(source.opens(), 0);
    assert!(log.snapshot().submitted_pts.is_empty());
}

#[test]
fn buffered_output_is_flushed_in_order() {
    let backend = FakeBackend::new().with_encoder_delay(4);
    let log = backend.log();
    let mut source = ScriptedSource::new(Resolution::new(32, 32));
    let session = RecordingSession::new("clip.mp4", 1, 6).unwrap();

    let stats = recorder(backend).record(&mut source, &session).unwrap();

    let log = log.snapshot();
    // four held back, drained one per flush call, then one empty call
    assert_eq!(log.flush_calls, 5);
    assert_eq!(log.written_pts, (0..6).collect::<Vec<_>>());
    assert_eq!(stats.packets_written, 6);
}

#[test]
fn write_failure_aborts_session() {
    let backend = FakeBackend::new().fail_write_at(5);
    let log = backend.log();
    let mut source = ScriptedSource::new(Resolution::new(32, 32));
    let session = RecordingSession::new("clip.mp4", 2, 5).unwrap();

    let result = recorder(backend).record(&mut source, &session);

    assert!(matches!(result, Err(RecordError::WriteFailed(_))));
    assert_eq!(source.captures(), 5);
    assert_eq!(source.closes(), 1);

    let log = log.snapshot();
    assert_eq!(log.written_pts, vec![0, 1, 2, 3]);
    assert_eq!(log.containers_closed, 1);
}

#[test]
fn pacing_is_not_compensated() {
    let mut pacer = PacingLog::default();
    let mut source = ScriptedSource::new(Resolution::new(32, 32));
    let session = RecordingSession::new("clip.mp4", 3, 4).unwrap();

    let mut recorder = ClipRecorder::new(FakeBackend::new()).with_pacer(&mut pacer);
    recorder.record(&mut source, &session).unwrap();
    drop(recorder);

    assert_eq!(pacer.pauses.len(), 12);
    assert!(pacer
        .pauses
        .iter()
        .all(|p| *p == std::time::Duration::from_millis(250)));
}

#[test]
fn container_receives_target_path_and_stream() {
    let backend = FakeBackend::new();
    let log = backend.log();
    let mut source = ScriptedSource::new(Resolution::new(320, 240));
    let session = RecordingSession::new("captures/desk.mp4", 1, 2).unwrap();

    let stats = recorder(backend).record(&mut source, &session).unwrap();

    let log = log.snapshot();
    assert_eq!(
        log.container_path.as_deref(),
        Some(std::path::Path::new("captures/desk.mp4"))
    );
    assert_eq!(log.container_params.map(|p| p.width), Some(320));
    assert_eq!(stats.output_path, "captures/desk.mp4");
    assert!((stats.media_duration_secs - 1.0).abs() < 1e-9);
}
