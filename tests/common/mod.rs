//! Test infrastructure for buddy-games integration tests.
//!
//! Provides a scriptable generator, a recording audio sink, and event
//! collection helpers, so game flows can be tested without the remote
//! generative service or real audio output.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;

// Re-export key types from the main crate
pub use buddy_games_rs::audio::AudioBuffer;
pub use buddy_games_rs::character::CharacterId;
pub use buddy_games_rs::content::{ContentClient, SharedContentClient};
pub use buddy_games_rs::event::{Event, EventBus, Subscriber};
pub use buddy_games_rs::generate::Generator;
pub use buddy_games_rs::message::MessageAction;
pub use buddy_games_rs::playback::{AudioQueue, PlaybackAction};
pub use buddy_games_rs::shell::{self, ShellAction, ShellState, SharedShell};
pub use buddy_games_rs::sink::OutputSink;

use anyhow::{bail, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};

/// Scriptable stand-in for the remote generative service.
///
/// Produces a fixed, valid round per game kind and numbered feedback
/// phrases. Synthesized audio is a real base64 PCM payload so it survives
/// the playback decode path.
pub struct FakeGenerator {
    pub text_calls: AtomicUsize,
    pub synth_calls: AtomicUsize,
    pub fail_all: AtomicBool,
    counter: AtomicUsize,
}

impl FakeGenerator {
    pub fn shared() -> Arc<FakeGenerator> {
        Arc::new(FakeGenerator {
            text_calls: AtomicUsize::new(0),
            synth_calls: AtomicUsize::new(0),
            fail_all: AtomicBool::new(false),
            counter: AtomicUsize::new(0),
        })
    }

    /// A generator where every remote call fails.
    pub fn failing() -> Arc<FakeGenerator> {
        let generator = Self::shared();
        generator.fail_all.store(true, Ordering::SeqCst);
        generator
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate_text(&self, _prompt: &str) -> Result<String> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all.load(Ordering::SeqCst) {
            bail!("remote text generation down");
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Wow, amazing {n}!"))
    }

    async fn generate_structured(&self, prompt: &str, _schema: Value) -> Result<Value> {
        if self.fail_all.load(Ordering::SeqCst) {
            bail!("remote structured generation down");
        }

        if prompt.contains("counting question") {
            Ok(json!({
                "target": 7,
                "distractors": [2, 3],
                "question": "Find 7!",
            }))
        } else if prompt.contains("letter recognition") {
            Ok(json!({
                "target": "B",
                "distractors": ["A", "C", "D"],
                "question": "Catch the letter B!",
            }))
        } else if prompt.contains("color mixing") {
            Ok(json!({
                "targetColor": "Purple",
                "requiredMix": ["Red", "Blue"],
                "question": "Let's make Purple magic!",
            }))
        } else {
            Ok(json!({
                "sequence": ["1", "2", "1", "?"],
                "correctAnswer": "2",
                "options": ["1", "3", "4"],
                "question": "What comes next?",
            }))
        }
    }

    async fn synthesize(&self, _text: &str, _voice: &str) -> Result<String> {
        self.synth_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all.load(Ordering::SeqCst) {
            bail!("remote synthesis down");
        }

        // 480 frames of silence, ~20ms at 24 kHz
        Ok(BASE64.encode(vec![0u8; 960]))
    }
}

/// Sink that records the frame count of every played buffer.
#[derive(Default)]
pub struct RecordingSink {
    played: Mutex<Vec<usize>>,
    pub resumes: AtomicUsize,
}

impl RecordingSink {
    pub fn shared() -> Arc<RecordingSink> {
        Arc::new(RecordingSink::default())
    }

    pub fn played(&self) -> Vec<usize> {
        self.played.lock().unwrap().clone()
    }

    pub fn play_count(&self) -> usize {
        self.played.lock().unwrap().len()
    }
}

#[async_trait]
impl OutputSink for RecordingSink {
    async fn play(&self, buffer: AudioBuffer) -> Result<()> {
        let frames = buffer.frame_count();
        tokio::time::sleep(buffer.duration()).await;
        self.played.lock().unwrap().push(frames);
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.resumes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Test harness wiring a fake generator into a real content client and
/// event bus.
pub struct TestHarness {
    pub bus: EventBus,
    pub generator: Arc<FakeGenerator>,
    pub client: SharedContentClient,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_generator(FakeGenerator::shared())
    }

    pub fn with_generator(generator: Arc<FakeGenerator>) -> Self {
        let client = ContentClient::new(generator.clone());
        Self {
            bus: EventBus::new(),
            generator,
            client,
        }
    }

    pub fn subscribe(&self) -> Subscriber {
        self.bus.subscribe()
    }

    /// Spawns the game shell with its event loop attached to the bus.
    pub async fn spawn_shell(&self, child_name: &str) -> SharedShell {
        shell::init(
            &self.bus,
            self.client.clone(),
            child_name.to_string(),
            Some(1),
        )
        .await
    }

    pub fn start_game(&self, character: CharacterId) {
        self.bus.send(Event::Shell(ShellAction::StartGame { character }));
    }

    pub fn select(&self, choice: &str) {
        self.bus.send(Event::Shell(ShellAction::Select {
            choice: choice.to_string(),
        }));
    }

    pub fn next_round(&self) {
        self.bus.send(Event::Shell(ShellAction::NextRound));
    }

    pub fn speak(&self, text: &str) {
        self.bus.send(Event::Shell(ShellAction::Speak {
            text: text.to_string(),
        }));
    }

    pub fn leave_game(&self) {
        self.bus.send(Event::Shell(ShellAction::LeaveGame));
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects all events from a subscriber within a timeout period.
/// Returns events in the order they were received.
pub async fn collect_events(subscriber: &mut Subscriber, timeout: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        match subscriber.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty) => {
                if tokio::time::Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            Err(TryRecvError::Lagged(n)) => {
                eprintln!("Warning: subscriber lagged, missed {n} events");
            }
            Err(TryRecvError::Closed) => break,
        }
    }

    events
}

/// Waits for a specific type of event within a timeout.
pub async fn wait_for_event<F>(
    subscriber: &mut Subscriber,
    timeout: Duration,
    matches: F,
) -> Option<Event>
where
    F: Fn(&Event) -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        match subscriber.try_recv() {
            Ok(event) if matches(&event) => return Some(event),
            Ok(_) => continue,
            Err(TryRecvError::Empty) => {
                if tokio::time::Instant::now() >= deadline {
                    return None;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Closed) => return None,
        }
    }
}

/// Filters message events.
pub fn filter_message_events(events: &[Event]) -> Vec<&MessageAction> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Message(action) => Some(action),
            _ => None,
        })
        .collect()
}

/// Filters playback events.
pub fn filter_playback_events(events: &[Event]) -> Vec<&PlaybackAction> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Playback(action) => Some(action),
            _ => None,
        })
        .collect()
}

/// Checks if an event is a Message::Say with text containing a substring.
pub fn is_message_containing(event: &Event, substring: &str) -> bool {
    matches!(event, Event::Message(MessageAction::Say { text }) if text.contains(substring))
}

/// Checks if any event in the list contains the given substring in its message.
pub fn has_message_containing(events: &[Event], substring: &str) -> bool {
    events.iter().any(|e| is_message_containing(e, substring))
}

/// Extracts the text from Message::Say events.
pub fn extract_say_texts(events: &[Event]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Message(MessageAction::Say { text }) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// Finds the first question board among the events.
pub fn first_board(events: &[Event]) -> Option<(&str, &[String])> {
    events.iter().find_map(|e| match e {
        Event::Message(MessageAction::Board { question, choices }) => {
            Some((question.as_str(), choices.as_slice()))
        }
        _ => None,
    })
}

/// Asserts that a specific event type was received.
#[macro_export]
macro_rules! assert_event_received {
    ($events:expr, $pattern:pat) => {
        assert!(
            $events.iter().any(|e| matches!(e, $pattern)),
            "Expected event matching {} not found in {:?}",
            stringify!($pattern),
            $events
        );
    };
}

/// Asserts that a specific event type was NOT received.
#[macro_export]
macro_rules! assert_event_not_received {
    ($events:expr, $pattern:pat) => {
        assert!(
            !$events.iter().any(|e| matches!(e, $pattern)),
            "Unexpected event matching {} found in {:?}",
            stringify!($pattern),
            $events
        );
    };
}
