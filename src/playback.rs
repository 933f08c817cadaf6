//! Strictly serial audio playback queue.
//!
//! Spoken lines are enqueued by independent callers (greeting, per-answer
//! feedback, manual replay) and must be heard one at a time in enqueue
//! order. A single worker task pulls buffers and awaits each `play` to
//! completion before pulling the next, so ordering holds regardless of the
//! order in which the async operations that produced the buffers finished.

use crate::audio::{self, AudioBuffer};
use crate::event::{Event, EventBus};
use crate::sink::OutputSink;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Clone, Debug)]
pub enum PlaybackAction {
    /// Decode a base64 PCM payload and append it to the playback queue
    Enqueue { audio: String },

    /// Reactivate the output device after platform autoplay suspension.
    /// Sent on every user interaction; idempotent.
    Resume,
}

#[derive(Clone)]
pub struct AudioQueue {
    tx: mpsc::UnboundedSender<AudioBuffer>,
    sink: Arc<dyn OutputSink>,
}

impl AudioQueue {
    pub fn new(sink: Arc<dyn OutputSink>) -> AudioQueue {
        let (tx, mut rx) = mpsc::unbounded_channel::<AudioBuffer>();

        let worker_sink = sink.clone();
        tokio::spawn(async move {
            // Completion-chained: the next buffer is only pulled after the
            // previous play resolved, so entries never overlap
            while let Some(buffer) = rx.recv().await {
                if let Err(e) = worker_sink.play(buffer).await {
                    // A failed buffer is skipped, never retried; the queue
                    // keeps going with the next entry
                    error!("Audio playback failed, skipping entry: {e:?}");
                }
            }
        });

        AudioQueue { tx, sink }
    }

    /// Append a buffer to the tail of the queue. Non-blocking; playback
    /// starts as soon as all earlier entries have finished.
    pub fn enqueue(&self, buffer: AudioBuffer) {
        if buffer.is_empty() {
            debug!("Ignoring empty audio buffer");
            return;
        }

        if self.tx.send(buffer).is_err() {
            error!("Playback worker is gone, dropping audio buffer");
        }
    }

    pub async fn resume(&self) {
        if let Err(e) = self.sink.resume().await {
            warn!("Failed to resume audio output: {e:?}");
        }
    }
}

/// Start the playback event loop: decodes enqueued base64 payloads and
/// feeds the queue. Undecodable payloads are logged and dropped, never
/// fatal.
pub fn init(bus: &EventBus, queue: AudioQueue) {
    let bus = bus.clone();
    tokio::spawn(async move {
        let mut subscriber = bus.subscribe();

        loop {
            let event = subscriber.recv().await;

            if let Event::Playback(action) = event {
                match action {
                    PlaybackAction::Enqueue { audio } => match audio::decode_speech(&audio) {
                        Ok(buffer) => queue.enqueue(buffer),
                        Err(e) => error!("Dropping undecodable audio payload: {e:?}"),
                    },
                    PlaybackAction::Resume => queue.resume().await,
                }
            }
        }
    });
}
