//! PCM decoding utilities for synthesized speech payloads.
//!
//! The speech synthesis capability returns base64-encoded raw 16-bit
//! little-endian PCM with no container header. These helpers turn such
//! payloads into normalized floating-point buffers ready for playback.

use crate::constants::{SPEECH_CHANNELS, SPEECH_SAMPLE_RATE};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use byteorder::{ByteOrder, LittleEndian};
use std::time::Duration;

/// Decoded, playable audio. Immutable once decoded; ownership moves into
/// the playback queue and the buffer is dropped after it has played.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    pub channels: u16,
    pub sample_rate: u32,
    /// One sample vector per channel, values in [-1.0, 1.0]
    pub samples: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn frame_count(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Wall-clock duration of the buffer at its sample rate
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }
}

/// Decode raw interleaved signed 16-bit little-endian PCM into a buffer.
///
/// Frame count is `floor(len / 2 / channels)`; a trailing odd byte or
/// incomplete frame is dropped rather than treated as an error, so
/// insufficient input yields an empty buffer.
pub fn decode_pcm(bytes: &[u8], sample_rate: u32, channels: u16) -> AudioBuffer {
    let channels = channels.max(1);
    let frame_count = bytes.len() / 2 / channels as usize;

    let mut samples: Vec<Vec<f32>> = (0..channels)
        .map(|_| Vec::with_capacity(frame_count))
        .collect();

    for frame in 0..frame_count {
        for (ch, channel_samples) in samples.iter_mut().enumerate() {
            let offset = (frame * channels as usize + ch) * 2;
            let value = LittleEndian::read_i16(&bytes[offset..offset + 2]);
            // Convert 16-bit integer (-32768..32767) to float (-1.0..1.0)
            channel_samples.push(value as f32 / 32768.0);
        }
    }

    AudioBuffer {
        channels,
        sample_rate,
        samples,
    }
}

/// Decode a base64-encoded raw PCM payload. Invalid base64 is an error;
/// callers log and skip the payload rather than propagating.
pub fn decode_base64_pcm(payload: &str, sample_rate: u32, channels: u16) -> Result<AudioBuffer> {
    let bytes = BASE64
        .decode(payload)
        .context("Invalid base64 audio payload")?;

    Ok(decode_pcm(&bytes, sample_rate, channels))
}

/// Decode a speech payload at the synthesis capability's fixed format
/// (24 kHz mono).
pub fn decode_speech(payload: &str) -> Result<AudioBuffer> {
    decode_base64_pcm(payload, SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)
}
