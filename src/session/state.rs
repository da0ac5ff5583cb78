use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mode of the recording session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    #[default]
    Idle,
    Recording,
    Stopped,
    Playing,
    Error,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionMode::Idle => "idle",
            SessionMode::Recording => "recording",
            SessionMode::Stopped => "stopped",
            SessionMode::Playing => "playing",
            SessionMode::Error => "error",
        };
        f.write_str(label)
    }
}

/// Point-in-time view of a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current state machine mode
    pub mode: SessionMode,

    /// Whole seconds counted by the recording ticker
    pub elapsed_seconds: u64,

    /// Playback position in milliseconds
    pub playback_position_ms: u64,

    /// Location of the last captured artifact, if one is kept
    pub recording_uri: Option<String>,

    /// Whether a capture handle is currently owned by the controller
    pub capture_open: bool,

    /// Whether a playback handle is currently loaded
    pub playback_loaded: bool,

    /// Whether a new capture may be started
    pub session_ready: bool,

    /// Whether a release is currently running
    pub cleanup_in_flight: bool,

    /// Description of the error that put the session into `Error`
    pub last_error: Option<String>,

    /// When the current (or last) capture started
    pub recording_started_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn playback_position_seconds(&self) -> f64 {
        self.playback_position_ms as f64 / 1000.0
    }

    pub fn is_recording(&self) -> bool {
        self.mode == SessionMode::Recording
    }
}
