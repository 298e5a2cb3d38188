//! Configuration management for clipcam
//!
//! Provides loading, saving and validation of the camera, recording and
//! output settings used to build a [`RecordingSession`].

use crate::errors::RecordError;
use crate::recording::{
    ContainerFormat, RecordingSession, VideoCodec, DEFAULT_DURATION_SECS,
    DEFAULT_FRAMES_PER_SECOND,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipcamConfig {
    pub camera: CameraConfig,
    pub recording: RecordingConfig,
    pub output: OutputConfig,
}

/// Camera selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Index of the camera to record from
    pub device_index: u32,
    /// Requested resolution [width, height]
    pub resolution: [u32; 2],
}

/// Clip parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Clip length in seconds
    pub duration_secs: u32,
    /// Snapshots per second
    pub frames_per_second: u32,
    /// Where the clip is written
    pub output_path: String,
    /// Container name; inferred from `output_path` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_format: Option<String>,
    /// Codec name; the container default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
}

/// MP4 writer options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Put the index at the front of the file
    pub fast_start: bool,
    /// Title metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: [640, 480],
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            output_path: "clip.mp4".to_string(),
            container_format: None,
            codec: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            fast_start: true,
            title: None,
        }
    }
}

impl Default for ClipcamConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            recording: RecordingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ClipcamConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RecordError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            RecordError::InvalidConfig(format!("Failed to read config file: {}", e))
        })?;

        let config: ClipcamConfig = toml::from_str(&contents).map_err(|e| {
            RecordError::InvalidConfig(format!("Failed to parse config file: {}", e))
        })?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RecordError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RecordError::InvalidConfig(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            RecordError::InvalidConfig(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            RecordError::InvalidConfig(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("clipcam.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), RecordError> {
        let invalid = |msg: &str| Err(RecordError::InvalidConfig(msg.to_string()));

        if self.camera.resolution[0] == 0 || self.camera.resolution[1] == 0 {
            return invalid("Invalid camera resolution");
        }
        if self.recording.frames_per_second == 0 || self.recording.frames_per_second > 240 {
            return invalid("Invalid frame rate (must be 1-240)");
        }
        if self.recording.duration_secs == 0 || self.recording.duration_secs > 3600 {
            return invalid("Invalid duration (must be 1-3600 seconds)");
        }
        if self.recording.output_path.trim().is_empty() {
            return invalid("Output path must not be empty");
        }
        self.container_format()?;
        self.codec()?;

        Ok(())
    }

    /// Parsed container override
    pub fn container_format(&self) -> Result<Option<ContainerFormat>, RecordError> {
        self.recording
            .container_format
            .as_deref()
            .map(|name| {
                ContainerFormat::from_name(name).ok_or_else(|| {
                    RecordError::InvalidConfig(format!("Unknown container format: {}", name))
                })
            })
            .transpose()
    }

    /// Parsed codec override
    pub fn codec(&self) -> Result<Option<VideoCodec>, RecordError> {
        self.recording
            .codec
            .as_deref()
            .map(|name| {
                VideoCodec::from_name(name)
                    .ok_or_else(|| RecordError::InvalidConfig(format!("Unknown codec: {}", name)))
            })
            .transpose()
    }

    /// Build the session this configuration describes
    pub fn session(&self) -> Result<RecordingSession, RecordError> {
        self.validate()?;

        let [width, height] = self.camera.resolution;
        let mut session = RecordingSession::new(
            &self.recording.output_path,
            self.recording.duration_secs,
            self.recording.frames_per_second,
        )?
        .with_resolution(width, height);

        if let Some(format) = self.container_format()? {
            session = session.with_container_format(format);
        }
        if let Some(codec) = self.codec()? {
            session = session.with_codec(codec);
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClipcamConfig::default();
        assert_eq!(config.camera.resolution, [640, 480]);
        assert_eq!(config.recording.duration_secs, 10);
        assert_eq!(config.recording.frames_per_second, 20);
        assert!(config.output.fast_start);
    }

    #[test]
    fn test_config_validation() {
        let config = ClipcamConfig::default();
        assert!(config.validate().is_ok());

        let mut bad_resolution = config.clone();
        bad_resolution.camera.resolution = [0, 0];
        assert!(bad_resolution.validate().is_err());

        let mut bad_fps = ClipcamConfig::default();
        bad_fps.recording.frames_per_second = 500;
        assert!(bad_fps.validate().is_err());

        let mut bad_codec = ClipcamConfig::default();
        bad_codec.recording.codec = Some("vp9".to_string());
        assert!(matches!(
            bad_codec.validate(),
            Err(RecordError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nested").join("clipcam.toml");

        let mut config = ClipcamConfig::default();
        config.recording.duration_secs = 3;
        config.output.title = Some("Desk cam".to_string());
        assert!(config.save_to_file(&config_path).is_ok());

        let loaded = ClipcamConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_toml_format() {
        let config = ClipcamConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[camera]"));
        assert!(toml_string.contains("[recording]"));
        assert!(toml_string.contains("[output]"));
        assert!(toml_string.contains("frames_per_second"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ClipcamConfig = toml::from_str(
            r#"
            [recording]
            duration_secs = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.recording.duration_secs, 4);
        assert_eq!(config.recording.frames_per_second, 20);
        assert_eq!(config.camera.device_index, 0);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ClipcamConfig::load_from_file("nonexistent_file.toml");
        assert_eq!(result.unwrap(), ClipcamConfig::default());
    }

    #[test]
    fn test_session_from_config() {
        let mut config = ClipcamConfig::default();
        config.camera.resolution = [1280, 720];
        config.recording.output_path = "out.m4v".to_string();
        config.recording.codec = Some("avc".to_string());

        let session = config.session().unwrap();
        assert_eq!(session.width, 1280);
        assert_eq!(session.height, 720);
        assert_eq!(session.frame_count(), 200);
        assert_eq!(session.codec, Some(VideoCodec::H264));
        assert_eq!(session.container_format, None);
    }
}
