//! Testing utilities for clipcam
//!
//! Synthetic frames plus scripted stand-ins for a camera and a media
//! backend, so recordings can be exercised without hardware or codecs.

mod fakes;
pub mod synthetic;

pub use fakes::{
    FakeBackend, FakeContainer, FakeEncoder, PacingLog, PipelineLog, PipelineLogHandle,
    ScriptedSource,
};
pub use synthetic::{synthetic_frame, SyntheticLayout};
