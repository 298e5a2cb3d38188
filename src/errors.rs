use thiserror::Error;

/// Errors raised while configuring or running a clip recording.
///
/// Every variant is terminal for the session that raised it.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The frame source could not be opened or stopped producing bitmaps.
    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),
    /// The encoder or the output container could not be configured.
    #[error("Pipeline initialization failed: {0}")]
    PipelineInitFailed(String),
    /// The encoder rejected a picture after setup succeeded.
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),
    /// The container failed to write or finalize.
    #[error("Write failed: {0}")]
    WriteFailed(String),
    /// Session or configuration values were rejected before recording started.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RecordError {
    /// Short machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordError::SourceUnavailable(_) => "source_unavailable",
            RecordError::PipelineInitFailed(_) => "pipeline_init_failed",
            RecordError::EncodeFailed(_) => "encode_failed",
            RecordError::WriteFailed(_) => "write_failed",
            RecordError::InvalidConfig(_) => "invalid_config",
        }
    }
}
