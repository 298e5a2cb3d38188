//! Recording session and result types

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::pipeline::{ContainerFormat, Rational, VideoCodec};
use crate::errors::RecordError;
use crate::source::Resolution;

/// Clip length used when nothing else is asked for
pub const DEFAULT_DURATION_SECS: u32 = 10;
/// Snapshot rate used when nothing else is asked for
pub const DEFAULT_FRAMES_PER_SECOND: u32 = 20;

/// Everything needed to record one clip. Fixed once recording starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSession {
    /// Output file
    pub target_path: PathBuf,
    /// Clip length in seconds
    pub duration_secs: NonZeroU32,
    /// Snapshots taken per second
    pub frames_per_second: NonZeroU32,
    /// Resolution requested from the camera
    pub width: u32,
    pub height: u32,
    /// Container override; inferred from the file extension when unset
    pub container_format: Option<ContainerFormat>,
    /// Codec override; the container's default when unset
    pub codec: Option<VideoCodec>,
}

impl RecordingSession {
    /// Create a session at the default VGA resolution
    pub fn new<P: AsRef<Path>>(
        target_path: P,
        duration_secs: u32,
        frames_per_second: u32,
    ) -> Result<Self, RecordError> {
        let duration_secs = NonZeroU32::new(duration_secs).ok_or_else(|| {
            RecordError::InvalidConfig("duration must be at least one second".to_string())
        })?;
        let frames_per_second = NonZeroU32::new(frames_per_second).ok_or_else(|| {
            RecordError::InvalidConfig(
                "frame rate must be at least one frame per second".to_string(),
            )
        })?;

        Ok(Self {
            target_path: target_path.as_ref().to_path_buf(),
            duration_secs,
            frames_per_second,
            width: Resolution::VGA.width,
            height: Resolution::VGA.height,
            container_format: None,
            codec: None,
        })
    }

    /// Request a different camera resolution
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Force a container instead of guessing from the extension
    pub fn with_container_format(mut self, format: ContainerFormat) -> Self {
        self.container_format = Some(format);
        self
    }

    /// Force a codec instead of the container default
    pub fn with_codec(mut self, codec: VideoCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Frames requested over the whole session; a trailing partial second
    /// is never padded
    pub fn frame_count(&self) -> u64 {
        u64::from(self.duration_secs.get()) * u64::from(self.frames_per_second.get())
    }

    /// One tick per frame
    pub fn time_base(&self) -> Rational {
        Rational::new(1, self.frames_per_second.get())
    }

    /// Container to write, explicit or inferred from the path
    pub fn resolve_container_format(&self) -> Result<ContainerFormat, RecordError> {
        if let Some(format) = self.container_format {
            return Ok(format);
        }
        ContainerFormat::from_path(&self.target_path).ok_or_else(|| {
            RecordError::PipelineInitFailed(format!(
                "cannot infer container format from {}",
                self.target_path.display()
            ))
        })
    }
}

/// Statistics returned after a clip is written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingStats {
    /// Pictures handed to the encoder
    pub frames_submitted: u64,
    /// Packets the container accepted
    pub packets_written: u64,
    /// Size of the finished file as reported by the container
    pub bytes_written: u64,
    /// Playback length of the written stream
    pub media_duration_secs: f64,
    /// Wall-clock time the session took, pacing included
    pub elapsed_secs: f64,
    pub output_path: String,
}

impl RecordingStats {
    /// Average bitrate of the written file in bits per second
    pub fn avg_bitrate(&self) -> f64 {
        if self.media_duration_secs > 0.0 {
            (self.bytes_written as f64 * 8.0) / self.media_duration_secs
        } else {
            0.0
        }
    }
}
