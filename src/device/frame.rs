// Synthetic microphone signal
//
// The file-backed capture device has no physical microphone, so it records
// a sine tone generated frame by frame at the configured rate.

use std::f32::consts::TAU;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

impl AudioFrame {
    /// Duration covered by this frame in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        frames * 1000 / self.sample_rate as u64
    }
}

/// Sine tone generator
pub struct ToneSource {
    sample_rate: u32,
    channels: u16,
    frequency_hz: f32,
    amplitude: f32,
    phase: f32,
    frames_emitted: u64,
}

impl ToneSource {
    pub fn new(sample_rate: u32, channels: u16, frequency_hz: f32) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            frequency_hz,
            amplitude: 0.25,
            phase: 0.0,
            frames_emitted: 0,
        }
    }

    /// Produce the next `duration_ms` of audio
    pub fn next_frame(&mut self, duration_ms: u64) -> AudioFrame {
        let timestamp_ms = self.frames_emitted * 1000 / self.sample_rate.max(1) as u64;
        let frame_count = (self.sample_rate as u64 * duration_ms / 1000) as usize;
        let step = TAU * self.frequency_hz / self.sample_rate.max(1) as f32;

        let mut samples = Vec::with_capacity(frame_count * self.channels as usize);
        for _ in 0..frame_count {
            let value = (self.phase.sin() * self.amplitude * i16::MAX as f32) as i16;
            for _ in 0..self.channels {
                samples.push(value);
            }
            self.phase = (self.phase + step) % TAU;
        }
        self.frames_emitted += frame_count as u64;

        AudioFrame {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
            timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_frame_size() {
        let mut source = ToneSource::new(16000, 1, 440.0);
        let frame = source.next_frame(100);

        assert_eq!(frame.samples.len(), 1600); // 100ms at 16kHz
        assert_eq!(frame.timestamp_ms, 0);
        assert_eq!(frame.duration_ms(), 100);
    }

    #[test]
    fn test_tone_timestamps_advance() {
        let mut source = ToneSource::new(16000, 1, 440.0);
        source.next_frame(100);
        let second = source.next_frame(100);

        assert_eq!(second.timestamp_ms, 100);
    }

    #[test]
    fn test_tone_stereo_interleaved() {
        let mut source = ToneSource::new(8000, 2, 440.0);
        let frame = source.next_frame(50);

        assert_eq!(frame.samples.len(), 800); // 400 frames * 2 channels
        for pair in frame.samples.chunks_exact(2) {
            assert_eq!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_tone_is_not_silent() {
        let mut source = ToneSource::new(16000, 1, 440.0);
        let frame = source.next_frame(100);

        assert!(frame.samples.iter().any(|&s| s != 0));
        assert!(frame.samples.iter().all(|&s| (s as i32).abs() <= i16::MAX as i32 / 4 + 1));
    }
}
