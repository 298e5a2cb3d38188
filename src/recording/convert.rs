//! Bitmap to encoder picture conversion
//!
//! Conversion happens in two steps. Any captured bitmap is first normalized
//! to packed RGB; a [`PictureConverter`] then writes it into the planar
//! 4:2:0 [`Picture`] the encoder consumes, scaling when the camera delivers
//! a different size than the stream was configured for.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};

use super::pipeline::PixelFormat;
use crate::errors::RecordError;
use crate::source::Resolution;

/// Normalize a bitmap to packed 8-bit RGB.
///
/// A bitmap that is already RGB8 is handed back as-is, without copying its
/// pixels, so applying this twice is the same as applying it once.
pub fn to_packed_rgb(image: DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(buffer) => buffer,
        other => other.to_rgb8(),
    }
}

/// A reusable planar YUV 4:2:0 frame buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    width: u32,
    height: u32,
    data: Vec<u8>,
    pts: i64,
}

impl Picture {
    /// Allocate a black picture
    pub fn new(width: u32, height: u32) -> Self {
        let size = PixelFormat::Yuv420p.frame_size(width, height);
        let luma = width as usize * height as usize;
        let mut data = vec![16u8; size];
        data[luma..].fill(128);
        Self {
            width,
            height,
            data,
            pts: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Presentation index in stream time base ticks
    pub fn pts(&self) -> i64 {
        self.pts
    }

    pub fn set_pts(&mut self, pts: i64) {
        self.pts = pts;
    }

    /// All three planes back to back: Y, then U, then V
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn y_plane(&self) -> &[u8] {
        &self.data[..self.luma_size()]
    }

    pub fn u_plane(&self) -> &[u8] {
        let start = self.luma_size();
        &self.data[start..start + self.chroma_size()]
    }

    pub fn v_plane(&self) -> &[u8] {
        let start = self.luma_size() + self.chroma_size();
        &self.data[start..start + self.chroma_size()]
    }

    fn luma_size(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn chroma_size(&self) -> usize {
        (self.width as usize / 2) * (self.height as usize / 2)
    }
}

/// Converts packed RGB bitmaps of one fixed size into pictures.
///
/// Built from the first captured frame, since the camera's native size is
/// only known once it delivers something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PictureConverter {
    source: Resolution,
    target: Resolution,
}

impl PictureConverter {
    /// Converter from `frame`'s size to `picture`'s
    pub fn for_frame(frame: &RgbImage, picture: &Picture) -> Self {
        let source = Resolution::new(frame.width(), frame.height());
        let target = picture.resolution();
        if source != target {
            log::warn!("Camera delivers {}, scaling every frame to {}", source, target);
        }
        Self { source, target }
    }

    pub fn source_resolution(&self) -> Resolution {
        self.source
    }

    pub fn needs_scaling(&self) -> bool {
        self.source != self.target
    }

    /// Write `frame` into `picture` and stamp it with `pts`
    pub fn to_picture(
        &self,
        frame: &RgbImage,
        picture: &mut Picture,
        pts: i64,
    ) -> Result<(), RecordError> {
        let actual = Resolution::new(frame.width(), frame.height());
        if actual != self.source {
            return Err(RecordError::EncodeFailed(format!(
                "frame size changed from {} to {} mid-session",
                self.source, actual
            )));
        }
        if picture.resolution() != self.target {
            return Err(RecordError::EncodeFailed(format!(
                "picture is {}, converter targets {}",
                picture.resolution(),
                self.target
            )));
        }

        let scaled;
        let rgb = if self.needs_scaling() {
            scaled = imageops::resize(
                frame,
                self.target.width,
                self.target.height,
                FilterType::Triangle,
            );
            &scaled
        } else {
            frame
        };

        rgb_to_yuv420(rgb.as_raw(), self.target.width, self.target.height, &mut picture.data);
        picture.pts = pts;
        Ok(())
    }
}

/// BT.601 studio-swing RGB24 to I420. Chroma is the average of each 2x2 block.
fn rgb_to_yuv420(rgb: &[u8], width: u32, height: u32, yuv: &mut [u8]) {
    let w = width as usize;
    let h = height as usize;
    let cw = w / 2;
    let ch = h / 2;
    if w == 0 || h == 0 {
        return;
    }

    let (y_plane, uv_planes) = yuv.split_at_mut(w * h);
    let (u_plane, v_plane) = uv_planes.split_at_mut(cw * ch);

    for (row, y_row) in y_plane.chunks_exact_mut(w).enumerate() {
        for (x, y_val) in y_row.iter_mut().enumerate() {
            let i = (row * w + x) * 3;
            let (r, g, b) = (rgb[i] as i32, rgb[i + 1] as i32, rgb[i + 2] as i32);
            *y_val = (((66 * r + 129 * g + 25 * b + 128) >> 8) + 16).clamp(0, 255) as u8;
        }
    }

    for cy in 0..ch {
        for cx in 0..cw {
            let (mut r, mut g, mut b) = (0i32, 0i32, 0i32);
            for (dy, dx) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                let i = ((cy * 2 + dy) * w + cx * 2 + dx) * 3;
                r += rgb[i] as i32;
                g += rgb[i + 1] as i32;
                b += rgb[i + 2] as i32;
            }
            let (r, g, b) = ((r + 2) / 4, (g + 2) / 4, (b + 2) / 4);

            let idx = cy * cw + cx;
            u_plane[idx] = (((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128).clamp(0, 255) as u8;
            v_plane[idx] = (((112 * r - 94 * g - 18 * b + 128) >> 8) + 128).clamp(0, 255) as u8;
        }
    }
}
