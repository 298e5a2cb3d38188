//! Clip recording
//!
//! [`ClipRecorder`] drives a [`FrameSource`](crate::source::FrameSource)
//! through an encoder and a container supplied by a [`MediaBackend`]. With
//! the `recording` feature, [`NativeBackend`] provides:
//! - openh264 for H.264 encoding
//! - muxide for MP4 muxing
//!
//! # Example
//! ```rust,ignore
//! use clipcam::recording::{ClipRecorder, NativeBackend, RecordingSession};
//! use clipcam::source::{CameraSource, Resolution};
//!
//! let session = RecordingSession::new("clip.mp4", 10, 20)?;
//! let mut camera = CameraSource::new(0, session.resolution(), 20)?;
//!
//! let stats = ClipRecorder::new(NativeBackend::new()).record(&mut camera, &session)?;
//! println!("wrote {} bytes", stats.bytes_written);
//! ```

mod convert;
mod pipeline;
mod recorder;
mod session;

#[cfg(feature = "recording")]
mod encoder;
#[cfg(feature = "recording")]
mod muxer;
#[cfg(feature = "recording")]
mod native;

pub use convert::{to_packed_rgb, Picture, PictureConverter};
pub use pipeline::{
    ContainerFormat, ContainerStats, EncodedPacket, MediaBackend, OutputContainer, PixelFormat,
    Rational, StreamParams, VideoCodec, VideoEncoder,
};
pub use recorder::ClipRecorder;
pub use session::{
    RecordingSession, RecordingStats, DEFAULT_DURATION_SECS, DEFAULT_FRAMES_PER_SECOND,
};

#[cfg(feature = "recording")]
pub use encoder::H264Encoder;
#[cfg(feature = "recording")]
pub use muxer::{Mp4Container, Mp4Options};
#[cfg(feature = "recording")]
pub use native::NativeBackend;
