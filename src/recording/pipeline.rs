//! Encoder and container capabilities
//!
//! The recorder never talks to a codec library directly. It asks a
//! [`MediaBackend`] for an encoder and a container configured from the same
//! [`StreamParams`], then moves packets from one to the other.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::convert::Picture;
use crate::errors::RecordError;
use crate::source::Resolution;

/// Exact fraction, used for stream time bases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    pub fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    pub fn as_f64(&self) -> f64 {
        if self.den == 0 {
            return 0.0;
        }
        f64::from(self.num) / f64::from(self.den)
    }
}

/// In-memory pixel layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Packed 8-bit RGB, three bytes per pixel
    Rgb24,
    /// Planar YUV with both chroma planes at half resolution in each direction
    Yuv420p,
}

impl PixelFormat {
    /// Bytes needed for one frame in this layout
    pub fn frame_size(&self, width: u32, height: u32) -> usize {
        let (w, h) = (width as usize, height as usize);
        match self {
            PixelFormat::Rgb24 => w * h * 3,
            PixelFormat::Yuv420p => w * h + 2 * ((w / 2) * (h / 2)),
        }
    }
}

/// Video codecs a session may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoCodec {
    H264,
    H265,
}

impl VideoCodec {
    /// Look up a codec by one of its common names
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "h264" | "avc" | "avc1" | "libopenh264" => Some(VideoCodec::H264),
            "h265" | "hevc" | "hvc1" => Some(VideoCodec::H265),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
        }
    }
}

/// Output container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerFormat {
    Mp4,
}

impl ContainerFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mp4" | "m4v" => Some(ContainerFormat::Mp4),
            _ => None,
        }
    }

    /// Guess the container from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    /// Codec used when the session does not name one
    pub fn default_video_codec(&self) -> VideoCodec {
        match self {
            ContainerFormat::Mp4 => VideoCodec::H264,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
        }
    }
}

/// Everything an encoder and a container must agree on before the first frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamParams {
    pub codec: VideoCodec,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    /// Duration of one pts tick
    pub time_base: Rational,
}

impl StreamParams {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Nominal frame rate, the inverse of the time base
    pub fn fps(&self) -> f64 {
        if self.time_base.num == 0 {
            return 0.0;
        }
        f64::from(self.time_base.den) / f64::from(self.time_base.num)
    }

    /// Reject dimensions chroma subsampling can't represent
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.width == 0 || self.height == 0 {
            return Err(RecordError::PipelineInitFailed(format!(
                "invalid resolution {}x{}",
                self.width, self.height
            )));
        }
        let odd = self.width % 2 != 0 || self.height % 2 != 0;
        if self.pixel_format == PixelFormat::Yuv420p && odd {
            return Err(RecordError::PipelineInitFailed(format!(
                "resolution {}x{} must be even for 4:2:0 encoding",
                self.width, self.height
            )));
        }
        if self.time_base.num == 0 || self.time_base.den == 0 {
            return Err(RecordError::PipelineInitFailed(format!(
                "invalid time base {}/{}",
                self.time_base.num, self.time_base.den
            )));
        }
        Ok(())
    }
}

/// One unit of compressed output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPacket {
    /// Compressed bytes; Annex B for H.264
    pub data: Vec<u8>,
    /// Presentation index in stream time base ticks
    pub pts: i64,
    pub is_keyframe: bool,
}

/// Turns pictures into packets.
pub trait VideoEncoder {
    /// Submit a picture, or `None` to drain buffered output.
    ///
    /// Returns every packet completed by this call, in emission order. An
    /// empty result for `None` means the encoder holds nothing more.
    fn encode(&mut self, picture: Option<&Picture>) -> Result<Vec<EncodedPacket>, RecordError>;
}

/// Owns the output file for one session.
pub trait OutputContainer {
    /// Append one packet to the stream
    fn write(&mut self, packet: &EncodedPacket) -> Result<(), RecordError>;

    /// Finalize and close the file. Consumes the container so it closes once.
    fn finish(self) -> Result<ContainerStats, RecordError>;
}

/// What a container reports when it closes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerStats {
    pub packets_written: u64,
    pub bytes_written: u64,
    pub duration_secs: f64,
}

/// Factory for the encoder/container pair of a session
pub trait MediaBackend {
    type Encoder: VideoEncoder;
    type Container: OutputContainer;

    /// Build and open an encoder for `params`
    fn create_encoder(&mut self, params: &StreamParams) -> Result<Self::Encoder, RecordError>;

    /// Create the output file at `path` with a single video stream
    /// described by `params`, ready to accept packets
    fn create_container(
        &mut self,
        path: &Path,
        format: ContainerFormat,
        params: &StreamParams,
    ) -> Result<Self::Container, RecordError>;
}

impl<B: MediaBackend + ?Sized> MediaBackend for &mut B {
    type Encoder = B::Encoder;
    type Container = B::Container;

    fn create_encoder(&mut self, params: &StreamParams) -> Result<Self::Encoder, RecordError> {
        (**self).create_encoder(params)
    }

    fn create_container(
        &mut self,
        path: &Path,
        format: ContainerFormat,
        params: &StreamParams,
    ) -> Result<Self::Container, RecordError> {
        (**self).create_container(path, format, params)
    }
}
