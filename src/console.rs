//! Line-oriented driver for the recording controller
//!
//! Stands in for the recording screen: each stdin line is a user action or a
//! host lifecycle event, and leave confirmations are answered on stdin too.

use crate::host::{HostLifecycle, NavigationDecision};
use crate::session::{Notice, RecordingController, SessionMode, SessionUi};
use anyhow::{bail, Result};
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tokio::time::Duration;
use tracing::{info, warn};

/// Shared stdin line feed
pub type LineFeed = Arc<Mutex<mpsc::Receiver<String>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Record,
    Stop,
    Play,
    Pause,
    Discard,
    Retry,
    Background,
    Foreground,
    Leave,
    Back,
    Wait(Duration),
    Status,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            bail!("Empty command");
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "record" | "rerecord" => Command::Record,
            "stop" => Command::Stop,
            "play" => Command::Play,
            "pause" => Command::Pause,
            "discard" => Command::Discard,
            "retry" => Command::Retry,
            "background" | "bg" => Command::Background,
            "foreground" | "fg" => Command::Foreground,
            "leave" => Command::Leave,
            "back" => Command::Back,
            "status" => Command::Status,
            "quit" | "exit" => Command::Quit,
            "wait" => {
                let secs: f64 = match parts.next() {
                    Some(value) => value.parse()?,
                    None => 1.0,
                };
                if !secs.is_finite() || secs < 0.0 {
                    bail!("Wait needs a non-negative number of seconds");
                }
                Command::Wait(Duration::from_secs_f64(secs))
            }
            other => bail!("Unknown command: {}", other),
        };

        if parts.next().is_some() && !matches!(command, Command::Wait(_)) {
            bail!("{} takes no arguments", word);
        }

        Ok(command)
    }
}

/// Forward stdin lines into a channel until EOF
pub fn spawn_stdin_reader() -> LineFeed {
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    Arc::new(Mutex::new(rx))
}

/// Terminal presentation of the recording screen
pub struct ConsoleUi {
    lines: LineFeed,
}

impl ConsoleUi {
    pub fn new(lines: LineFeed) -> Self {
        Self { lines }
    }
}

#[async_trait::async_trait]
impl SessionUi for ConsoleUi {
    async fn confirm_leave(&self) -> bool {
        println!("Recording in progress. Leave and discard it? [y/N]");
        let answer = self.lines.lock().await.recv().await;
        matches!(
            answer.as_deref().map(|a| a.trim().to_ascii_lowercase()).as_deref(),
            Some("y") | Some("yes")
        )
    }

    fn notify(&self, notice: Notice) {
        match notice {
            Notice::RecordingInterrupted => {
                println!("Recording stopped because the app went to the background.")
            }
            Notice::PleaseWait => println!("Please wait, the recorder is getting ready."),
            Notice::PlaybackUnavailable(message) => println!("{}", message),
            Notice::Error { message, retryable } => {
                if retryable {
                    println!("{} (type 'retry')", message);
                } else {
                    println!("{}", message);
                }
            }
        }
    }
}

/// Command loop over one mounted controller
pub struct Console {
    lines: LineFeed,
    controller: RecordingController,
    host: Arc<HostLifecycle>,
}

impl Console {
    pub fn new(lines: LineFeed, controller: RecordingController, host: Arc<HostLifecycle>) -> Self {
        Self {
            lines,
            controller,
            host,
        }
    }

    /// Run until `quit`, EOF or a navigation that is allowed to proceed
    pub async fn run(&self) -> Result<()> {
        println!("Commands: record stop play pause discard retry background foreground leave back wait <secs> status quit");

        loop {
            let Some(line) = self.lines.lock().await.recv().await else {
                info!("Input closed");
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            if !self.execute(command).await? {
                break;
            }
        }

        self.controller.unmount().await;
        Ok(())
    }

    /// Returns false once the screen should close
    async fn execute(&self, command: Command) -> Result<bool> {
        let controller = &self.controller;

        let outcome = match command {
            Command::Record => match controller.mode().await {
                SessionMode::Stopped | SessionMode::Playing => controller.re_record().await,
                _ => controller.start_capture().await,
            },
            Command::Stop => controller.stop_capture().await.map(|artifact| {
                println!("Saved {} ({}ms)", artifact.uri, artifact.duration_ms);
            }),
            Command::Play => controller.play().await,
            Command::Pause => controller.pause().await,
            Command::Discard => controller.discard().await,
            Command::Retry => controller.retry().await,
            Command::Background => {
                self.host.app_backgrounded();
                Ok(())
            }
            Command::Foreground => {
                self.host.app_foregrounded();
                Ok(())
            }
            Command::Leave | Command::Back => {
                let decision = if command == Command::Leave {
                    self.host.request_navigation_leave().await
                } else {
                    self.host.hardware_back_pressed().await
                };
                match decision {
                    NavigationDecision::Proceed => {
                        println!("Leaving the recording screen");
                        return Ok(false);
                    }
                    NavigationDecision::Stay => {
                        println!("Staying on the recording screen");
                        Ok(())
                    }
                }
            }
            Command::Wait(duration) => {
                tokio::time::sleep(duration).await;
                Ok(())
            }
            Command::Status => {
                let snapshot = controller.snapshot().await;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                Ok(())
            }
            Command::Quit => return Ok(false),
        };

        if let Err(e) = outcome {
            println!("{}", e.user_message());
        }

        Ok(true)
    }
}
