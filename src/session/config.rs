use crate::device::AudioModeOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable timing and device-mode profiles for the recording controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Pause between the audio-mode resets and the recording configuration
    /// Default: 300ms
    pub settle_delay_ms: u64,

    /// Period of the recording elapsed-time ticker
    /// Default: 1000ms
    pub elapsed_tick_ms: u64,

    /// Period of the playback position poll
    /// Default: 100ms
    pub playback_poll_ms: u64,

    /// Applied on mount, on retry and when the app returns to the foreground
    pub idle_mode: AudioModeOptions,

    /// Applied in order before every new capture to clear a stale microphone lock
    pub reset_modes: [AudioModeOptions; 2],

    /// Applied right before a capture is opened
    pub recording_mode: AudioModeOptions,

    /// Applied after a capture stops, before the preview is loaded
    pub playback_mode: AudioModeOptions,

    /// Applied by a full release
    pub inert_mode: AudioModeOptions,
}

impl ControllerConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn elapsed_tick(&self) -> Duration {
        Duration::from_millis(self.elapsed_tick_ms.max(1))
    }

    pub fn playback_poll(&self) -> Duration {
        Duration::from_millis(self.playback_poll_ms.max(1))
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let preview = AudioModeOptions::new(false, true, false);

        Self {
            settle_delay_ms: 300,
            elapsed_tick_ms: 1000,
            playback_poll_ms: 100,
            idle_mode: preview,
            reset_modes: [
                AudioModeOptions::INERT,
                AudioModeOptions::new(false, true, true),
            ],
            recording_mode: AudioModeOptions::new(true, true, false),
            playback_mode: preview,
            inert_mode: AudioModeOptions::INERT,
        }
    }
}
