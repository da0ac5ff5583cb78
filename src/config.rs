use crate::device::WavCaptureConfig;
use crate::session::ControllerConfig;
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub controller: ControllerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "capture-session".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub recordings_path: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub frame_duration_ms: u64,
    pub tone_hz: f32,
    pub permission_granted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            recordings_path: "recordings".to_string(),
            sample_rate: 16000,
            channels: 1,
            frame_duration_ms: 100,
            tone_hz: 440.0,
            permission_granted: true,
        }
    }
}

impl AudioConfig {
    pub fn capture_config(&self) -> WavCaptureConfig {
        WavCaptureConfig {
            recordings_dir: PathBuf::from(&self.recordings_path),
            sample_rate: self.sample_rate,
            channels: self.channels,
            frame_duration_ms: self.frame_duration_ms,
            tone_hz: self.tone_hz,
            permission_granted: self.permission_granted,
        }
    }
}

impl Config {
    /// Load `path` (extension inferred, file optional) overlaid by
    /// `CAPTURE_SESSION__SECTION__KEY` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("CAPTURE_SESSION")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
