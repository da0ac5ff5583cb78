use anyhow::Result;
use capture_session::console::{self, Console, ConsoleUi};
use capture_session::{Config, HostLifecycle, RecordingController, WavCaptureDevice, WavPlaybackDevice};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Drive a recording session from the terminal
#[derive(Debug, Parser)]
#[command(name = "capture-session", version)]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/capture-session")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Recordings directory: {}", cfg.audio.recordings_path);
    info!(
        "Audio: {}Hz, {} channels, settle delay {}ms",
        cfg.audio.sample_rate, cfg.audio.channels, cfg.controller.settle_delay_ms
    );

    let lines = console::spawn_stdin_reader();
    let host = Arc::new(HostLifecycle::new());

    let controller = RecordingController::mount(
        cfg.controller.clone(),
        Arc::new(WavCaptureDevice::new(cfg.audio.capture_config())),
        Arc::new(WavPlaybackDevice::new()),
        Arc::new(ConsoleUi::new(Arc::clone(&lines))),
        Arc::clone(&host),
    )
    .await;

    Console::new(lines, controller, host).run().await
}
