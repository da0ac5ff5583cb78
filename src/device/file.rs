use anyhow::{Context, Result};
use hound::WavReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header-level view of a recorded WAV artifact
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per channel
    pub frame_count: u32,
}

impl AudioFile {
    /// Read the WAV header; sample data stays on disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file {}", path.display()))?;

        let spec = reader.spec();
        let audio = Self {
            path: path.to_path_buf(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            frame_count: reader.duration(),
        };

        debug!(
            "Audio file {}: {}ms, {}Hz, {} channels",
            path.display(),
            audio.duration_ms(),
            audio.sample_rate,
            audio.channels
        );

        Ok(audio)
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frame_count as u64 * 1000 / self.sample_rate as u64
    }

    /// Load every sample (i16 PCM, interleaved)
    pub fn read_samples(&self) -> Result<Vec<i16>> {
        let reader = WavReader::open(&self.path).context("Failed to reopen WAV file")?;
        reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")
    }
}
