//! Frame sources
//!
//! A frame source is anything that can report its resolution and hand out
//! the current bitmap on demand. The recorder borrows a source for the
//! duration of one session and drives its stream lifecycle.

#[cfg(feature = "camera")]
mod camera;

#[cfg(feature = "camera")]
pub use camera::{list_devices, CameraSource, DeviceInfo};

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::errors::RecordError;

/// Pixel dimensions of a source or stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 640x480, the resolution clips are recorded at unless asked otherwise
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels in one frame
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::VGA
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Resolution {
    type Err = RecordError;

    /// Parse `WIDTHxHEIGHT`, e.g. `1280x720`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            RecordError::InvalidConfig(format!("resolution should be WIDTHxHEIGHT, got {:?}", s))
        };
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse().map_err(|_| invalid())?;
        let height = h.trim().parse().map_err(|_| invalid())?;
        Ok(Self { width, height })
    }
}

/// A device or generator that produces bitmaps on demand.
///
/// Implementations report failures as [`RecordError::SourceUnavailable`].
pub trait FrameSource {
    /// Resolution of the bitmaps the source currently produces
    fn resolution(&self) -> Resolution;

    /// Start the underlying stream
    fn open(&mut self) -> Result<(), RecordError>;

    /// Grab the current bitmap. The pixel layout is whatever the device
    /// produces natively.
    fn capture(&mut self) -> Result<DynamicImage, RecordError>;

    /// Stop the underlying stream
    fn close(&mut self) -> Result<(), RecordError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn resolution(&self) -> Resolution {
        (**self).resolution()
    }

    fn open(&mut self) -> Result<(), RecordError> {
        (**self).open()
    }

    fn capture(&mut self) -> Result<DynamicImage, RecordError> {
        (**self).capture()
    }

    fn close(&mut self) -> Result<(), RecordError> {
        (**self).close()
    }
}
