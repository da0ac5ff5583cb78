use crate::error::SessionError;

/// User-visible message raised by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Recording was cut short by the app leaving the foreground
    RecordingInterrupted,
    /// A start was requested before the previous capture settled
    PleaseWait,
    /// Preview playback is broken but the artifact is kept
    PlaybackUnavailable(String),
    /// The session entered `Error`; `retryable` offers the retry action
    Error { message: String, retryable: bool },
}

impl Notice {
    pub fn from_error(error: &SessionError) -> Self {
        Notice::Error {
            message: error.user_message(),
            retryable: error.is_fatal(),
        }
    }
}

/// Presentation side of the recording screen
#[async_trait::async_trait]
pub trait SessionUi: Send + Sync {
    /// Ask whether to abandon an ongoing recording and leave
    async fn confirm_leave(&self) -> bool;

    /// Show a message to the user
    fn notify(&self, notice: Notice);
}
