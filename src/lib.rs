//! clipcam: fixed-length webcam clip recording
//!
//! Records a clip of a fixed duration from a camera at a fixed snapshot
//! rate and writes it to an MP4 file. Capture, encoding and muxing are
//! delegated to nokhwa, openh264 and muxide; this crate wires them together
//! and converts captured bitmaps into the layout the encoder expects.
//!
//! # Features
//! - `camera`: nokhwa-backed [`source::CameraSource`] and device listing
//! - `recording`: openh264/muxide-backed [`recording::NativeBackend`]
//!
//! # Usage
//! ```rust,ignore
//! use clipcam::recording::{ClipRecorder, NativeBackend, RecordingSession};
//! use clipcam::source::CameraSource;
//!
//! clipcam::init_logging();
//! let session = RecordingSession::new("clip.mp4", 10, 20)?;
//! let mut camera = CameraSource::new(0, session.resolution(), 20)?;
//! let stats = ClipRecorder::new(NativeBackend::new()).record(&mut camera, &session)?;
//! ```
pub mod config;
pub mod errors;
pub mod recording;
pub mod source;
pub mod timing;

// Testing utilities - synthetic frames and scripted fakes
pub mod testing;

pub use config::ClipcamConfig;
pub use errors::RecordError;
pub use recording::{ClipRecorder, RecordingSession, RecordingStats};
pub use source::{FrameSource, Resolution};

/// Initialize logging for the recorder
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "clipcam=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_info() {
        assert_eq!(NAME, "clipcam");
        assert!(!VERSION.is_empty());
    }
}
