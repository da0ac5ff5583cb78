// File-backed capture device
//
// Each open capture owns a WAV file under the recordings directory and a
// task that appends one synthetic frame per frame period until stopped.

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info, warn};

use super::capture::{
    AudioModeOptions, CaptureArtifact, CaptureDevice, CaptureHandle, PermissionStatus,
};
use super::frame::{AudioFrame, ToneSource};

/// Configuration for the WAV capture device
#[derive(Debug, Clone)]
pub struct WavCaptureConfig {
    /// Directory receiving `recording-<uuid>.wav` files
    pub recordings_dir: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    /// Period between written frames
    pub frame_duration_ms: u64,
    /// Frequency of the recorded tone
    pub tone_hz: f32,
    /// Answer given to permission requests
    pub permission_granted: bool,
}

impl WavCaptureConfig {
    pub fn new(recordings_dir: PathBuf) -> Self {
        Self {
            recordings_dir,
            sample_rate: 16000,
            channels: 1,
            frame_duration_ms: 100,
            tone_hz: 440.0,
            permission_granted: true,
        }
    }
}

struct ActiveCapture {
    path: PathBuf,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<Result<CaptureArtifact>>,
}

/// Capture device recording a tone into WAV files
pub struct WavCaptureDevice {
    config: WavCaptureConfig,
    mode: Mutex<AudioModeOptions>,
    active: Mutex<HashMap<u64, ActiveCapture>>,
    next_id: AtomicU64,
}

impl WavCaptureDevice {
    pub fn new(config: WavCaptureConfig) -> Self {
        info!(
            "WAV capture device initialized: {} ({}Hz, {} channels)",
            config.recordings_dir.display(),
            config.sample_rate,
            config.channels
        );

        Self {
            config,
            mode: Mutex::new(AudioModeOptions::INERT),
            active: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Audio mode most recently applied
    pub async fn current_mode(&self) -> AudioModeOptions {
        *self.mode.lock().await
    }

    /// Number of captures currently holding the microphone
    pub async fn open_captures(&self) -> usize {
        self.active.lock().await.len()
    }
}

#[async_trait::async_trait]
impl CaptureDevice for WavCaptureDevice {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        if self.config.permission_granted {
            Ok(PermissionStatus::Granted)
        } else {
            Ok(PermissionStatus::Denied)
        }
    }

    async fn configure_mode(&self, options: AudioModeOptions) -> Result<()> {
        debug!("Audio mode: {:?}", options);
        *self.mode.lock().await = options;
        Ok(())
    }

    async fn open_capture(&self) -> Result<CaptureHandle> {
        if !self.mode.lock().await.record_enabled {
            bail!("Audio mode does not allow recording");
        }

        let mut active = self.active.lock().await;
        if !active.is_empty() {
            bail!("Microphone is already in use by another capture");
        }

        fs::create_dir_all(&self.config.recordings_dir)
            .context("Failed to create recordings directory")?;

        let path = self
            .config
            .recordings_dir
            .join(format!("recording-{}.wav", uuid::Uuid::new_v4()));
        let sink = WavSink::create(path.clone(), self.config.sample_rate, self.config.channels)?;
        let source = ToneSource::new(
            self.config.sample_rate,
            self.config.channels,
            self.config.tone_hz,
        );

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run_capture(
            sink,
            source,
            self.config.frame_duration_ms,
            stop_rx,
        ));

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        active.insert(
            id,
            ActiveCapture {
                path: path.clone(),
                stop_tx,
                task,
            },
        );

        info!("Capture {} recording to {}", id, path.display());

        Ok(CaptureHandle::new(id))
    }

    async fn stop_and_release(&self, handle: CaptureHandle) -> Result<CaptureArtifact> {
        let capture = match self.active.lock().await.remove(&handle.id()) {
            Some(capture) => capture,
            None => bail!("Unknown capture handle {}", handle.id()),
        };

        // The task may already have ended on a write error
        let _ = capture.stop_tx.send(());

        let artifact = capture
            .task
            .await
            .context("Capture task panicked")?
            .with_context(|| format!("Failed to finish {}", capture.path.display()))?;

        info!(
            "Capture {} stopped: {}ms ({} samples)",
            handle.id(),
            artifact.duration_ms,
            artifact.sample_count
        );

        Ok(artifact)
    }

    fn name(&self) -> &str {
        "WAV file capture"
    }
}

async fn run_capture(
    mut sink: WavSink,
    mut source: ToneSource,
    frame_duration_ms: u64,
    mut stop_rx: oneshot::Receiver<()>,
) -> Result<CaptureArtifact> {
    let period = Duration::from_millis(frame_duration_ms.max(1));
    let mut ticker = time::interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                let frame = source.next_frame(frame_duration_ms);
                sink.write_frame(&frame)?;
            }
        }
    }

    sink.finish()
}

/// WAV writer that finalizes the file even when dropped mid-capture
struct WavSink {
    writer: Option<WavWriter<BufWriter<File>>>,
    path: PathBuf,
    sample_rate: u32,
    channels: u16,
    sample_count: usize,
}

impl WavSink {
    fn create(path: PathBuf, sample_rate: u32, channels: u16) -> Result<Self> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let writer = WavWriter::create(&path, spec)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        Ok(Self {
            writer: Some(writer),
            path,
            sample_rate,
            channels,
            sample_count: 0,
        })
    }

    fn write_frame(&mut self, frame: &AudioFrame) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            for &sample in &frame.samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }
            self.sample_count += frame.samples.len();
        }

        Ok(())
    }

    fn finish(mut self) -> Result<CaptureArtifact> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().context("Failed to finalize WAV file")?;
        }

        let frames = self.sample_count as u64 / self.channels.max(1) as u64;
        Ok(CaptureArtifact {
            uri: self.path.display().to_string(),
            duration_ms: frames * 1000 / self.sample_rate.max(1) as u64,
            sample_count: self.sample_count,
        })
    }
}

impl Drop for WavSink {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV writer on drop: {}", e);
            }
        }
    }
}
