//! Audio output sinks.
//!
//! The playback queue talks to an [OutputSink] rather than a concrete
//! device, so tests can assert playback order without real audio output.
//! The default implementation serves the decoded PCM as a WAV stream over
//! TCP; point any media player at the listen address to hear it.

use crate::audio::AudioBuffer;
use crate::constants::{BIT_DEPTH, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE};
use anyhow::Result;
use async_trait::async_trait;
use byteorder::{LittleEndian, WriteBytesExt};
use hound::{SampleFormat, WavSpec};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// An audio output device.
///
/// `play` must resolve only once the buffer has finished playing; the
/// playback queue relies on this for its ordering guarantee.
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn play(&self, buffer: AudioBuffer) -> Result<()>;

    /// Reactivate a suspended device. Idempotent; safe to call on every
    /// user interaction.
    async fn resume(&self) -> Result<()>;
}

/// Streams played buffers to connected TCP clients as an endless WAV file.
///
/// The listener is bound lazily on first use. The device starts in a
/// suspended state (mirroring platform autoplay restrictions): until the
/// first `resume`, buffers are paced in real time but nothing is written,
/// so queue ordering is preserved either way.
pub struct StreamSink {
    listen_addr: String,
    clients: Arc<Mutex<Vec<TcpStream>>>,
    listening: Mutex<bool>,
    suspended: AtomicBool,
}

impl StreamSink {
    pub fn new(listen_addr: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            clients: Arc::new(Mutex::new(Vec::new())),
            listening: Mutex::new(false),
            suspended: AtomicBool::new(true),
        }
    }

    /// Bind the listener and start accepting clients. Idempotent.
    async fn ensure_listener(&self) -> Result<()> {
        let mut listening = self.listening.lock().await;
        if *listening {
            return Ok(());
        }

        let listener = TcpListener::bind(&self.listen_addr).await?;
        info!("Audio stream available on {}", self.listen_addr);
        *listening = true;

        let clients = self.clients.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((mut stream, addr)) => {
                        info!("Audio listener connected from {addr}");

                        // Write a wav header for an infinite stream so
                        // players recognize the format
                        let spec = WavSpec {
                            channels: SPEECH_CHANNELS,
                            sample_rate: SPEECH_SAMPLE_RATE,
                            bits_per_sample: BIT_DEPTH,
                            sample_format: SampleFormat::Int,
                        };
                        let header = spec.into_header_for_infinite_file();

                        if let Err(e) = stream.write_all(&header[..]).await {
                            warn!("Failed to write wav header to {addr}: {e}");
                            continue;
                        }

                        clients.lock().await.push(stream);
                    }
                    Err(e) => {
                        warn!("Failed to accept audio listener: {e}");
                    }
                }
            }
        });

        Ok(())
    }

    /// Interleave and requantize the float samples back to 16-bit PCM
    fn to_pcm_bytes(buffer: &AudioBuffer) -> Vec<u8> {
        let frames = buffer.frame_count();
        let mut bytes = Vec::with_capacity(frames * buffer.channels as usize * 2);

        for frame in 0..frames {
            for channel in &buffer.samples {
                let value = (channel[frame] * 32767.0).clamp(-32768.0, 32767.0) as i16;
                // Writing to a Vec cannot fail
                WriteBytesExt::write_i16::<LittleEndian>(&mut bytes, value).unwrap();
            }
        }

        bytes
    }
}

#[async_trait]
impl OutputSink for StreamSink {
    async fn play(&self, buffer: AudioBuffer) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }

        let duration = buffer.duration();

        if !self.suspended.load(Ordering::SeqCst) {
            self.ensure_listener().await?;

            let bytes = Self::to_pcm_bytes(&buffer);
            let mut clients = self.clients.lock().await;
            let mut keep = Vec::with_capacity(clients.len());

            for mut stream in clients.drain(..) {
                match stream.write_all(&bytes).await {
                    Ok(()) => keep.push(stream),
                    Err(e) => info!("Dropping audio listener: {e}"),
                }
            }

            *clients = keep;
        }

        // Pace playback in real time; completion means the line was heard
        tokio::time::sleep(duration).await;

        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        if self.suspended.swap(false, Ordering::SeqCst) {
            debug!("Audio output resumed");
        }
        self.ensure_listener().await
    }
}
