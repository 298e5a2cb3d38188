//! openh264 + muxide backend

use std::path::Path;

use super::encoder::H264Encoder;
use super::muxer::{Mp4Container, Mp4Options};
use super::pipeline::{ContainerFormat, MediaBackend, StreamParams};
use crate::errors::RecordError;

/// openh264 encoding into muxide MP4 files
#[derive(Debug, Clone, Default)]
pub struct NativeBackend {
    options: Mp4Options,
}

impl NativeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.options.title = Some(title.into());
        self
    }

    pub fn with_fast_start(mut self, enabled: bool) -> Self {
        self.options.fast_start = enabled;
        self
    }
}

impl MediaBackend for NativeBackend {
    type Encoder = H264Encoder;
    type Container = Mp4Container;

    fn create_encoder(&mut self, params: &StreamParams) -> Result<H264Encoder, RecordError> {
        H264Encoder::new(params)
    }

    fn create_container(
        &mut self,
        path: &Path,
        format: ContainerFormat,
        params: &StreamParams,
    ) -> Result<Mp4Container, RecordError> {
        match format {
            ContainerFormat::Mp4 => Mp4Container::create(path, params, &self.options),
        }
    }
}
