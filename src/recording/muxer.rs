//! MP4 output container using muxide

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use muxide::api::{Metadata, Muxer, MuxerBuilder, VideoCodec as MuxCodec};

use super::pipeline::{ContainerStats, EncodedPacket, OutputContainer, StreamParams, VideoCodec};
use crate::errors::RecordError;

/// Options applied when the MP4 file is created
#[derive(Debug, Clone)]
pub struct Mp4Options {
    /// Write the moov box before mdat so playback can start early
    pub fast_start: bool,
    /// Title metadata
    pub title: Option<String>,
}

impl Default for Mp4Options {
    fn default() -> Self {
        Self {
            fast_start: true,
            title: None,
        }
    }
}

/// Single-video-stream MP4 file
pub struct Mp4Container {
    muxer: Muxer<BufWriter<File>>,
    tick_secs: f64,
}

impl Mp4Container {
    /// Create the file at `path` with one video stream
    pub fn create(
        path: &Path,
        params: &StreamParams,
        options: &Mp4Options,
    ) -> Result<Self, RecordError> {
        let codec = match params.codec {
            VideoCodec::H264 => MuxCodec::H264,
            other => {
                return Err(RecordError::PipelineInitFailed(format!(
                    "MP4 muxer does not support {}",
                    other.name()
                )))
            }
        };

        let file = File::create(path).map_err(|e| {
            RecordError::PipelineInitFailed(format!(
                "Failed to create output file {}: {}",
                path.display(),
                e
            ))
        })?;
        let writer = BufWriter::new(file);

        let mut metadata = Metadata::new().with_current_time();
        if let Some(ref title) = options.title {
            metadata = metadata.with_title(title);
        }

        let muxer = MuxerBuilder::new(writer)
            .video(codec, params.width, params.height, params.fps())
            .with_fast_start(options.fast_start)
            .with_metadata(metadata)
            .build()
            .map_err(|e| {
                RecordError::PipelineInitFailed(format!("Failed to create muxer: {}", e))
            })?;

        Ok(Self {
            muxer,
            tick_secs: params.time_base.as_f64(),
        })
    }
}

impl OutputContainer for Mp4Container {
    fn write(&mut self, packet: &EncodedPacket) -> Result<(), RecordError> {
        let pts_secs = packet.pts as f64 * self.tick_secs;
        self.muxer
            .write_video(pts_secs, &packet.data, packet.is_keyframe)
            .map_err(|e| {
                RecordError::WriteFailed(format!("Failed to write packet {}: {}", packet.pts, e))
            })?;
        Ok(())
    }

    fn finish(self) -> Result<ContainerStats, RecordError> {
        let stats = self.muxer.finish_with_stats().map_err(|e| {
            RecordError::WriteFailed(format!("Failed to finalize recording: {}", e))
        })?;

        Ok(ContainerStats {
            packets_written: stats.video_frames,
            bytes_written: stats.bytes_written,
            duration_secs: stats.duration_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::pipeline::{PixelFormat, Rational};

    fn params() -> StreamParams {
        StreamParams {
            codec: VideoCodec::H264,
            width: 320,
            height: 240,
            pixel_format: PixelFormat::Yuv420p,
            time_base: Rational::new(1, 20),
        }
    }

    #[test]
    fn test_unwritable_path_fails_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("clip.mp4");

        let result = Mp4Container::create(&path, &params(), &Mp4Options::default());
        assert!(matches!(result, Err(RecordError::PipelineInitFailed(_))));
    }

    #[test]
    fn test_h265_not_supported() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = params();
        p.codec = VideoCodec::H265;

        let result = Mp4Container::create(&dir.path().join("clip.mp4"), &p, &Mp4Options::default());
        assert!(matches!(result, Err(RecordError::PipelineInitFailed(_))));
    }

    #[test]
    fn test_finish_reports_written_packets() {
        use crate::recording::encoder::H264Encoder;
        use crate::recording::{Picture, VideoEncoder};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        let p = params();
        let mut encoder = H264Encoder::new(&p).unwrap();
        let mut container = Mp4Container::create(&path, &p, &Mp4Options::default()).unwrap();

        let mut picture = Picture::new(320, 240);
        for pts in 0..4 {
            picture.set_pts(pts);
            for packet in encoder.encode(Some(&picture)).unwrap() {
                container.write(&packet).unwrap();
            }
        }

        let stats = container.finish().unwrap();
        assert_eq!(stats.packets_written, 4);
        assert!(stats.bytes_written > 0);
        assert!(path.exists());
    }
}
