//! Error types for the recording session controller

use crate::session::SessionMode;
use std::fmt;
use thiserror::Error;

/// Individual step of a resource release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStep {
    StopCapture,
    UnloadPlayback,
    ResetAudioMode,
}

impl fmt::Display for CleanupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CleanupStep::StopCapture => "stop capture",
            CleanupStep::UnloadPlayback => "unload playback",
            CleanupStep::ResetAudioMode => "reset audio mode",
        };
        f.write_str(label)
    }
}

/// Recording session errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The user (or platform) refused microphone access
    #[error("Microphone permission denied")]
    PermissionDenied,

    /// Device audio mode could not be applied
    #[error("Device configuration failed: {0}")]
    DeviceConfigurationFailed(String),

    /// The capture device refused to open a new capture
    #[error("Capture open failed: {0}")]
    CaptureOpenFailed(String),

    /// Stopping the capture did not produce an artifact
    #[error("Capture stop failed: {0}")]
    CaptureStopFailed(String),

    /// The captured artifact could not be loaded for preview
    #[error("Playback load failed: {0}")]
    PlaybackLoadFailed(String),

    /// Preview playback failed while loaded
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    /// A single release step failed; always recovered locally
    #[error("Cleanup step '{step}' failed: {reason}")]
    CleanupStepFailed { step: CleanupStep, reason: String },

    /// A capture was requested while the previous one is still settling
    #[error("Session not ready for a new capture")]
    NotReady,

    /// The operation is not valid in the current mode
    #[error("Cannot {operation} while {mode}")]
    InvalidTransition {
        operation: &'static str,
        mode: SessionMode,
    },

    /// A release overtook the operation before it could complete
    #[error("Operation interrupted by session release")]
    Interrupted,
}

impl SessionError {
    /// Whether this error moves the session into `Error` mode
    ///
    /// Playback failures are not fatal: the captured artifact is still intact and
    /// the user can discard or re-record.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::PermissionDenied
                | SessionError::DeviceConfigurationFailed(_)
                | SessionError::CaptureOpenFailed(_)
                | SessionError::CaptureStopFailed(_)
        )
    }

    /// Get a user-friendly description of the error
    pub fn user_message(&self) -> String {
        match self {
            SessionError::PermissionDenied => {
                "Microphone access is required to record. Please allow it and try again."
                    .to_string()
            }
            SessionError::DeviceConfigurationFailed(_) => {
                "The audio device could not be prepared. Please try again.".to_string()
            }
            SessionError::CaptureOpenFailed(_) => {
                "Recording could not be started. Please try again.".to_string()
            }
            SessionError::CaptureStopFailed(_) => {
                "Recording could not be saved. Please try again.".to_string()
            }
            SessionError::PlaybackLoadFailed(_) | SessionError::PlaybackFailed(_) => {
                "Preview is unavailable, but your recording was kept.".to_string()
            }
            SessionError::CleanupStepFailed { .. } => {
                "Some audio resources could not be released cleanly.".to_string()
            }
            SessionError::NotReady => "Please wait, the recorder is still getting ready.".to_string(),
            SessionError::InvalidTransition { .. } => "That action is not available right now.".to_string(),
            SessionError::Interrupted => "Recording was interrupted.".to_string(),
        }
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
