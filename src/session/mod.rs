//! Recording session management
//!
//! This module provides the `RecordingController` that manages one recording
//! screen's microphone lifecycle:
//! - Permission and device audio-mode setup
//! - Capture start/stop with a stale-lock reset before every start
//! - Preview playback of the just-captured artifact
//! - Guaranteed resource release on stop, discard, backgrounding, navigation
//!   away, errors and unmount

mod config;
mod controller;
mod state;
mod ticker;
mod ui;

pub use config::ControllerConfig;
pub use controller::RecordingController;
pub use state::{SessionMode, SessionSnapshot};
pub use ui::{Notice, SessionUi};
