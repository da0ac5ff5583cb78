pub mod config;
pub mod console;
pub mod device;
pub mod error;
pub mod host;
pub mod session;

pub use config::Config;
pub use device::{
    AudioModeOptions, CaptureArtifact, CaptureDevice, CaptureHandle, PermissionStatus,
    PlaybackDevice, PlaybackHandle, PlaybackStatus, WavCaptureConfig, WavCaptureDevice,
    WavPlaybackDevice,
};
pub use error::{CleanupStep, SessionError};
pub use host::{HostEvent, HostLifecycle, LeaveRequest, NavigationDecision};
pub use session::{
    ControllerConfig, Notice, RecordingController, SessionMode, SessionSnapshot, SessionUi,
};
