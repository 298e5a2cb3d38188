//! H.264 encoder wrapper using openh264

use openh264::encoder::{Encoder, FrameType};
use openh264::formats::YUVBuffer;

use super::convert::Picture;
use super::pipeline::{EncodedPacket, PixelFormat, StreamParams, VideoCodec, VideoEncoder};
use crate::errors::RecordError;

/// H.264 encoder using openh264
///
/// openh264 emits one bitstream per input and keeps nothing back, so every
/// call produces zero or one packet and flushing yields nothing.
pub struct H264Encoder {
    encoder: Encoder,
    width: u32,
    height: u32,
    frame_count: u64,
}

impl H264Encoder {
    /// Create an encoder for `params`.
    ///
    /// openh264 infers dimensions from each YUV source at encode time; they
    /// are checked against `params` on every picture instead.
    pub fn new(params: &StreamParams) -> Result<Self, RecordError> {
        if params.codec != VideoCodec::H264 {
            return Err(RecordError::PipelineInitFailed(format!(
                "openh264 cannot encode {}",
                params.codec.name()
            )));
        }
        if params.pixel_format != PixelFormat::Yuv420p {
            return Err(RecordError::PipelineInitFailed(format!(
                "openh264 needs YUV 4:2:0 input, got {:?}",
                params.pixel_format
            )));
        }
        params.validate()?;

        let encoder = Encoder::new().map_err(|e| {
            RecordError::PipelineInitFailed(format!("Failed to create encoder: {}", e))
        })?;

        Ok(Self {
            encoder,
            width: params.width,
            height: params.height,
            frame_count: 0,
        })
    }

    /// Number of pictures encoded so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn encode_picture(&mut self, picture: &Picture) -> Result<Option<EncodedPacket>, RecordError> {
        if picture.width() != self.width || picture.height() != self.height {
            return Err(RecordError::EncodeFailed(format!(
                "picture is {}x{}, encoder configured for {}x{}",
                picture.width(),
                picture.height(),
                self.width,
                self.height
            )));
        }

        let yuv = YUVBuffer::from_vec(
            picture.data().to_vec(),
            self.width as usize,
            self.height as usize,
        );

        let bitstream = self
            .encoder
            .encode(&yuv)
            .map_err(|e| RecordError::EncodeFailed(format!("Encoding failed: {}", e)))?;

        self.frame_count += 1;

        let is_keyframe = matches!(bitstream.frame_type(), FrameType::IDR | FrameType::I);

        let data = bitstream.to_vec();
        if data.is_empty() {
            log::debug!("Encoder skipped picture {}", picture.pts());
            return Ok(None);
        }

        Ok(Some(EncodedPacket {
            data,
            pts: picture.pts(),
            is_keyframe,
        }))
    }
}

impl VideoEncoder for H264Encoder {
    fn encode(&mut self, picture: Option<&Picture>) -> Result<Vec<EncodedPacket>, RecordError> {
        match picture {
            Some(picture) => Ok(self.encode_picture(picture)?.into_iter().collect()),
            None => Ok(Vec::new()),
        }
    }
}
