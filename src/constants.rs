use std::time::Duration;

// Define some constants for the audio parameters
pub const SPEECH_SAMPLE_RATE: u32 = 24000; // Gemini TTS returns 24 kHz raw PCM
pub const SPEECH_CHANNELS: u16 = 1; // Mono
pub const BIT_DEPTH: u16 = 16; // 16 bits per sample

/// Target number of ready-to-play feedback items per outcome buffer
pub const FEEDBACK_BUFFER_TARGET: usize = 2;

/// How many recent round targets to exclude from generation requests
pub const ROUND_HISTORY_LEN: usize = 3;

/// Delay before loading the next round after a correct answer, so the
/// success feedback has a moment to play
pub const NEXT_ROUND_DELAY: Duration = Duration::from_secs(2);
