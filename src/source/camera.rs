use image::{DynamicImage, RgbImage};
use nokhwa::{
    pixel_format::RgbFormat,
    query,
    utils::{
        ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat,
        RequestedFormatType, Resolution as NokhwaResolution,
    },
    Camera,
};
use serde::{Deserialize, Serialize};

use super::{FrameSource, Resolution};
use crate::errors::RecordError;

/// A camera as reported by the platform backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// List the cameras currently connected
pub fn list_devices() -> Result<Vec<DeviceInfo>, RecordError> {
    let cameras = query(ApiBackend::Auto)
        .map_err(|e| RecordError::SourceUnavailable(format!("Failed to query cameras: {}", e)))?;

    Ok(cameras
        .into_iter()
        .map(|info| DeviceInfo {
            id: info.index().to_string(),
            name: info.human_name(),
            description: info.description().to_string(),
        })
        .collect())
}

/// Webcam frame source backed by nokhwa
pub struct CameraSource {
    camera: Camera,
}

impl CameraSource {
    /// Connect to the camera at `device_index`, asking for the format closest
    /// to `requested` at `fps`. The device may settle on something else;
    /// [`FrameSource::resolution`] reports what was negotiated.
    pub fn new(device_index: u32, requested: Resolution, fps: u32) -> Result<Self, RecordError> {
        let format = CameraFormat::new(
            NokhwaResolution::new(requested.width, requested.height),
            FrameFormat::MJPEG,
            fps,
        );
        let requested_format =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let camera =
            Camera::new(CameraIndex::Index(device_index), requested_format).map_err(|e| {
                RecordError::SourceUnavailable(format!(
                    "Failed to initialize camera {}: {}",
                    device_index, e
                ))
            })?;

        log::info!(
            "Camera {} negotiated {}x{} (requested {})",
            device_index,
            camera.resolution().width_x,
            camera.resolution().height_y,
            requested
        );

        Ok(Self { camera })
    }
}

impl FrameSource for CameraSource {
    fn resolution(&self) -> Resolution {
        let res = self.camera.resolution();
        Resolution::new(res.width_x, res.height_y)
    }

    fn open(&mut self) -> Result<(), RecordError> {
        self.camera.open_stream().map_err(|e| {
            RecordError::SourceUnavailable(format!("Failed to start stream: {}", e))
        })
    }

    fn capture(&mut self) -> Result<DynamicImage, RecordError> {
        let buffer = self.camera.frame().map_err(|e| {
            RecordError::SourceUnavailable(format!("Failed to capture frame: {}", e))
        })?;

        let res = buffer.resolution();
        let decoded = buffer.decode_image::<RgbFormat>().map_err(|e| {
            RecordError::SourceUnavailable(format!("Failed to decode frame: {}", e))
        })?;

        // Rebuild through raw bytes so our image types don't depend on the
        // image version nokhwa links against.
        let rgb = RgbImage::from_raw(res.width_x, res.height_y, decoded.into_raw())
            .ok_or_else(|| {
                RecordError::SourceUnavailable(format!(
                    "Decoded frame does not match {}x{}",
                    res.width_x, res.height_y
                ))
            })?;

        Ok(DynamicImage::ImageRgb8(rgb))
    }

    fn close(&mut self) -> Result<(), RecordError> {
        if !self.camera.is_stream_open() {
            return Ok(());
        }
        self.camera.stop_stream().map_err(|e| {
            RecordError::SourceUnavailable(format!("Failed to stop stream: {}", e))
        })
    }
}
