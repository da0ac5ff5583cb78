use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Loaded, playable sound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackHandle {
    id: u64,
}

impl PlaybackHandle {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Status reported by a playback poll
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub position_ms: u64,
    pub is_playing: bool,
    /// Playback reached the end of the sound since the last poll
    pub did_finish: bool,
    /// Device-side playback error, if any
    pub error: Option<String>,
}

/// Speaker playback device for local audio files
#[async_trait::async_trait]
pub trait PlaybackDevice: Send + Sync {
    /// Load a local audio file
    async fn load(&self, uri: &str) -> Result<PlaybackHandle>;

    async fn play(&self, handle: &PlaybackHandle) -> Result<()>;

    async fn pause(&self, handle: &PlaybackHandle) -> Result<()>;

    /// Release the sound
    async fn unload(&self, handle: PlaybackHandle) -> Result<()>;

    async fn poll_status(&self, handle: &PlaybackHandle) -> Result<PlaybackStatus>;

    /// Get device name for logging
    fn name(&self) -> &str;
}
