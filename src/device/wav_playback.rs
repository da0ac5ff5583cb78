use anyhow::{bail, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use super::file::AudioFile;
use super::playback::{PlaybackDevice, PlaybackHandle, PlaybackStatus};

struct LoadedSound {
    duration_ms: u64,
    /// Position at the last pause
    offset_ms: u64,
    playing_since: Option<Instant>,
}

impl LoadedSound {
    fn position_ms(&self) -> u64 {
        let running = self
            .playing_since
            .map(|since| since.elapsed().as_millis() as u64)
            .unwrap_or(0);
        (self.offset_ms + running).min(self.duration_ms)
    }
}

/// Playback device over local WAV files
///
/// No samples reach a speaker; the position follows the tokio clock so the
/// controller sees the same status stream a real player would produce.
pub struct WavPlaybackDevice {
    sounds: Mutex<HashMap<u64, LoadedSound>>,
    next_id: AtomicU64,
}

impl WavPlaybackDevice {
    pub fn new() -> Self {
        Self {
            sounds: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of sounds currently loaded
    pub async fn loaded_sounds(&self) -> usize {
        self.sounds.lock().await.len()
    }
}

impl Default for WavPlaybackDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PlaybackDevice for WavPlaybackDevice {
    async fn load(&self, uri: &str) -> Result<PlaybackHandle> {
        let file = AudioFile::open(uri)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        self.sounds.lock().await.insert(
            id,
            LoadedSound {
                duration_ms: file.duration_ms(),
                offset_ms: 0,
                playing_since: None,
            },
        );

        info!("Loaded sound {} from {} ({}ms)", id, uri, file.duration_ms());

        Ok(PlaybackHandle::new(id))
    }

    async fn play(&self, handle: &PlaybackHandle) -> Result<()> {
        let mut sounds = self.sounds.lock().await;
        let Some(sound) = sounds.get_mut(&handle.id()) else {
            bail!("Unknown sound {}", handle.id());
        };

        if sound.playing_since.is_none() {
            if sound.offset_ms >= sound.duration_ms {
                sound.offset_ms = 0;
            }
            sound.playing_since = Some(Instant::now());
        }

        Ok(())
    }

    async fn pause(&self, handle: &PlaybackHandle) -> Result<()> {
        let mut sounds = self.sounds.lock().await;
        let Some(sound) = sounds.get_mut(&handle.id()) else {
            bail!("Unknown sound {}", handle.id());
        };

        sound.offset_ms = sound.position_ms();
        sound.playing_since = None;

        Ok(())
    }

    async fn unload(&self, handle: PlaybackHandle) -> Result<()> {
        if self.sounds.lock().await.remove(&handle.id()).is_none() {
            bail!("Unknown sound {}", handle.id());
        }

        debug!("Unloaded sound {}", handle.id());
        Ok(())
    }

    async fn poll_status(&self, handle: &PlaybackHandle) -> Result<PlaybackStatus> {
        let mut sounds = self.sounds.lock().await;
        let Some(sound) = sounds.get_mut(&handle.id()) else {
            bail!("Unknown sound {}", handle.id());
        };

        let position_ms = sound.position_ms();
        let is_playing = sound.playing_since.is_some();

        if is_playing && position_ms >= sound.duration_ms {
            // Rewind so the next play starts from the beginning
            sound.playing_since = None;
            sound.offset_ms = 0;

            return Ok(PlaybackStatus {
                position_ms,
                is_playing: false,
                did_finish: true,
                error: None,
            });
        }

        Ok(PlaybackStatus {
            position_ms,
            is_playing,
            did_finish: false,
            error: None,
        })
    }

    fn name(&self) -> &str {
        "WAV file playback"
    }
}
