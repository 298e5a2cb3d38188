//! Fixed-length clip recorder combining a frame source, encoder and container

use std::time::Instant;

use super::convert::{to_packed_rgb, Picture, PictureConverter};
use super::pipeline::{
    EncodedPacket, MediaBackend, OutputContainer, PixelFormat, StreamParams, VideoEncoder,
};
use super::session::{RecordingSession, RecordingStats};
use crate::errors::RecordError;
use crate::source::FrameSource;
use crate::timing::{frame_interval, Pacer, SleepPacer};

/// Records fixed-length clips from a [`FrameSource`] through a [`MediaBackend`].
///
/// Everything runs on the calling thread: each frame is captured, converted,
/// encoded and written before the recorder pauses for one frame interval and
/// moves on to the next.
pub struct ClipRecorder<B: MediaBackend, P: Pacer = SleepPacer> {
    backend: B,
    pacer: P,
}

impl<B: MediaBackend> ClipRecorder<B, SleepPacer> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            pacer: SleepPacer,
        }
    }
}

impl<B: MediaBackend, P: Pacer> ClipRecorder<B, P> {
    /// Swap the pacing strategy
    pub fn with_pacer<Q: Pacer>(self, pacer: Q) -> ClipRecorder<B, Q> {
        ClipRecorder {
            backend: self.backend,
            pacer,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Record one clip as described by `session`.
    ///
    /// The encoder and container are set up before the source is opened, so
    /// a setup failure never touches the camera. Once the source is open it
    /// is closed again on every path, and the container is finished exactly
    /// once. A failed session leaves whatever was written on disk.
    pub fn record<S>(
        &mut self,
        source: &mut S,
        session: &RecordingSession,
    ) -> Result<RecordingStats, RecordError>
    where
        S: FrameSource + ?Sized,
    {
        let started = Instant::now();

        let format = session.resolve_container_format()?;
        let resolution = source.resolution();
        if resolution != session.resolution() {
            log::warn!(
                "Source resolution {} differs from requested {}, recording at {}",
                resolution,
                session.resolution(),
                resolution
            );
        }

        let params = StreamParams {
            codec: session.codec.unwrap_or_else(|| format.default_video_codec()),
            width: resolution.width,
            height: resolution.height,
            pixel_format: PixelFormat::Yuv420p,
            time_base: session.time_base(),
        };
        params.validate()?;

        let mut encoder = self.backend.create_encoder(&params)?;
        let mut container = self
            .backend
            .create_container(&session.target_path, format, &params)?;

        log::info!(
            "Recording {} frames ({}s at {} fps, {} {}) to {}",
            session.frame_count(),
            session.duration_secs,
            session.frames_per_second,
            params.codec.name(),
            resolution,
            session.target_path.display()
        );

        let mut progress = Progress::default();
        let outcome = match source.open() {
            Ok(()) => {
                let outcome = self.capture_loop(
                    source,
                    session,
                    &params,
                    &mut encoder,
                    &mut container,
                    &mut progress,
                );
                if let Err(e) = source.close() {
                    log::warn!("Failed to close frame source: {}", e);
                }
                outcome
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                let container_stats = container.finish()?;
                let stats = RecordingStats {
                    frames_submitted: progress.frames_submitted,
                    packets_written: progress.packets_written,
                    bytes_written: container_stats.bytes_written,
                    media_duration_secs: container_stats.duration_secs,
                    elapsed_secs: started.elapsed().as_secs_f64(),
                    output_path: session.target_path.display().to_string(),
                };
                log::info!(
                    "Recording finished: {} frames, {} packets, {} bytes in {:.2}s",
                    stats.frames_submitted,
                    stats.packets_written,
                    stats.bytes_written,
                    stats.elapsed_secs
                );
                Ok(stats)
            }
            Err(e) => {
                log::error!(
                    "Recording aborted after {} frames: {}",
                    progress.frames_submitted,
                    e
                );
                if let Err(close_err) = container.finish() {
                    log::warn!("Failed to close output container: {}", close_err);
                }
                Err(e)
            }
        }
    }

    fn capture_loop<S, E, C>(
        &mut self,
        source: &mut S,
        session: &RecordingSession,
        params: &StreamParams,
        encoder: &mut E,
        container: &mut C,
        progress: &mut Progress,
    ) -> Result<(), RecordError>
    where
        S: FrameSource + ?Sized,
        E: VideoEncoder,
        C: OutputContainer,
    {
        let interval = frame_interval(session.frames_per_second.get());
        let mut picture = Picture::new(params.width, params.height);
        let mut converter: Option<PictureConverter> = None;

        for index in 0..session.frame_count() {
            let frame = to_packed_rgb(source.capture()?);

            let conv =
                converter.get_or_insert_with(|| PictureConverter::for_frame(&frame, &picture));
            conv.to_picture(&frame, &mut picture, index as i64)?;

            let packets = encoder.encode(Some(&picture))?;
            progress.frames_submitted += 1;
            log::debug!("Frame {} produced {} packet(s)", index, packets.len());
            write_packets(container, packets, progress)?;

            self.pacer.pause(interval);
        }

        loop {
            let packets = encoder.encode(None)?;
            if packets.is_empty() {
                break;
            }
            log::debug!("Flush produced {} packet(s)", packets.len());
            write_packets(container, packets, progress)?;
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
struct Progress {
    frames_submitted: u64,
    packets_written: u64,
}

fn write_packets<C: OutputContainer>(
    container: &mut C,
    packets: Vec<EncodedPacket>,
    progress: &mut Progress,
) -> Result<(), RecordError> {
    for packet in &packets {
        container.write(packet)?;
        progress.packets_written += 1;
    }
    Ok(())
}
