use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Platform audio-session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioModeOptions {
    /// Microphone capture allowed
    pub record_enabled: bool,
    /// Lower other apps' audio while this session is active
    pub duck_others: bool,
    /// Keep the audio session alive while the app is in the background
    pub background_active: bool,
}

impl AudioModeOptions {
    /// Record-disabled, duck-disabled, background-disabled
    pub const INERT: AudioModeOptions = AudioModeOptions {
        record_enabled: false,
        duck_others: false,
        background_active: false,
    };

    pub const fn new(record_enabled: bool, duck_others: bool, background_active: bool) -> Self {
        Self {
            record_enabled,
            duck_others,
            background_active,
        }
    }
}

/// Answer to a microphone permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Live microphone capture owned by whoever holds it
///
/// Not `Clone`: giving it to [`CaptureDevice::stop_and_release`] is the only way to end it.
#[derive(Debug, PartialEq, Eq)]
pub struct CaptureHandle {
    id: u64,
}

impl CaptureHandle {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Result of a finished capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureArtifact {
    /// Location of the recorded audio
    pub uri: String,
    /// Recorded length in milliseconds
    pub duration_ms: u64,
    /// Number of samples written (all channels)
    pub sample_count: usize,
}

/// Microphone capture device
///
/// Implementations:
/// - [`super::WavCaptureDevice`]: writes a synthetic signal to WAV files
/// - test fakes with failure injection
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Ask the platform for microphone access
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// Apply a device audio mode
    async fn configure_mode(&self, options: AudioModeOptions) -> Result<()>;

    /// Open a new capture and start recording into it
    async fn open_capture(&self) -> Result<CaptureHandle>;

    /// Stop the capture and release the microphone
    ///
    /// The handle is consumed on every outcome; the device must release it even
    /// when finalizing the artifact fails.
    async fn stop_and_release(&self, handle: CaptureHandle) -> Result<CaptureArtifact>;

    /// Get device name for logging
    fn name(&self) -> &str;
}
