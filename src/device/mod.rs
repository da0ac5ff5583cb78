//! Device adapters for the microphone and speaker
//!
//! The controller only talks to the [`CaptureDevice`] and [`PlaybackDevice`]
//! traits. The WAV implementations here back the command-line driver and the
//! adapter tests.

pub mod capture;
pub mod file;
pub mod frame;
pub mod playback;
pub mod wav_capture;
pub mod wav_playback;

pub use capture::{
    AudioModeOptions, CaptureArtifact, CaptureDevice, CaptureHandle, PermissionStatus,
};
pub use file::AudioFile;
pub use frame::{AudioFrame, ToneSource};
pub use playback::{PlaybackDevice, PlaybackHandle, PlaybackStatus};
pub use wav_capture::{WavCaptureConfig, WavCaptureDevice};
pub use wav_playback::WavPlaybackDevice;
