//! Content/Feedback client: the sole point of contact with the remote
//! generative service.
//!
//! Owns the speech cache and the per-character feedback prefetch buffers.
//! All mutable shared state lives behind this façade; other components
//! never reach into the buffers directly.

use crate::character::{self, CharacterId};
use crate::feedback::{FeedbackBuffer, FeedbackItem};
use crate::generate::Generator;
use crate::round::{self, GameKind, GameRound};
use crate::speech::SpeechCache;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedContentClient = Arc<ContentClient>;

pub struct ContentClient {
    generator: Arc<dyn Generator>,
    cache: Mutex<SpeechCache>,
    buffers: Mutex<HashMap<CharacterId, FeedbackBuffer>>,
    /// Characters with a prefetch currently in flight (single-flight per
    /// character, not per outcome kind)
    prefetching: Mutex<HashSet<CharacterId>>,
}

impl ContentClient {
    pub fn new(generator: Arc<dyn Generator>) -> SharedContentClient {
        Arc::new(Self {
            generator,
            cache: Mutex::new(SpeechCache::new()),
            buffers: Mutex::new(HashMap::new()),
            prefetching: Mutex::new(HashSet::new()),
        })
    }

    /// Synthesize speech for `text` in the character's voice, memoized by
    /// `(character, exact text)`.
    ///
    /// Concurrent misses for the same key may each call the remote service;
    /// utterances are short-lived and the duplicate cost is small, so there
    /// is no in-flight coalescing. A failure is not cached, so a later call
    /// with the same text retries.
    pub async fn synthesize_speech(&self, character: CharacterId, text: &str) -> Option<String> {
        if let Some(audio) = self.cache.lock().await.get(character, text) {
            return Some(audio);
        }

        let voice = character::by_id(character).voice_name;

        match self.generator.synthesize(text, voice).await {
            Ok(audio) => {
                self.cache
                    .lock()
                    .await
                    .insert(character, text, audio.clone());
                Some(audio)
            }
            Err(e) => {
                error!("Speech synthesis failed for {character}: {e:?}");
                None
            }
        }
    }

    /// Request one game round. `history` holds recently seen targets; the
    /// request asks the service to avoid them, but this is a hint only and
    /// callers must tolerate occasional repeats.
    ///
    /// On failure the numeric game falls back to a fixed default round;
    /// other kinds return `None` and the front-end shows a retry affordance.
    pub async fn generate_round(
        &self,
        kind: GameKind,
        level: u32,
        history: &[String],
    ) -> Option<GameRound> {
        let (prompt, schema) = round_request(kind, level, history);

        let result = match self.generator.generate_structured(&prompt, schema).await {
            Ok(value) => GameRound::from_value(kind, value),
            Err(e) => Err(e),
        };

        match result {
            Ok(round) => Some(round),
            Err(e) => {
                error!("Round generation failed for {kind:?}: {e:?}");

                if kind == GameKind::NumberJump {
                    info!("Falling back to the default number round");
                    Some(round::fallback_number_round())
                } else {
                    None
                }
            }
        }
    }

    /// Top up the character's outcome buffers toward their target size,
    /// generating at most one item per outcome lane per invocation.
    ///
    /// Single-flight per character: a call while another prefetch for the
    /// same character is outstanding is a no-op.
    pub async fn prefetch_feedback(&self, character: CharacterId, child_name: &str) {
        {
            let mut inflight = self.prefetching.lock().await;
            if !inflight.insert(character) {
                debug!("Prefetch already in flight for {character}");
                return;
            }
        }

        for is_correct in [true, false] {
            let needs = self
                .buffers
                .lock()
                .await
                .entry(character)
                .or_default()
                .needs(is_correct);

            if !needs {
                continue;
            }

            if let Some(item) = self
                .generate_single_feedback(character, is_correct, child_name)
                .await
            {
                debug!(
                    "Prefetched {} feedback for {character}: {:?}",
                    if is_correct { "success" } else { "failure" },
                    item.text
                );
                self.buffers
                    .lock()
                    .await
                    .entry(character)
                    .or_default()
                    .push(is_correct, item);
            }
        }

        self.prefetching.lock().await.remove(&character);
    }

    /// Immediate spoken reaction to an answer.
    ///
    /// Pops the matching prefetch buffer when possible (no network wait).
    /// An empty buffer falls back to synchronous generation, and if even
    /// that fails, to a fixed default phrase with best-effort audio. Never
    /// fails. Either way a background refill is scheduled afterwards.
    pub async fn get_encouragement(
        self: &Arc<Self>,
        character: CharacterId,
        is_correct: bool,
        child_name: &str,
    ) -> FeedbackItem {
        let buffered = self
            .buffers
            .lock()
            .await
            .entry(character)
            .or_default()
            .pop(is_correct);

        // Replenish in the background regardless of which path serves
        // this call
        let client = self.clone();
        let name = child_name.to_string();
        tokio::spawn(async move {
            client.prefetch_feedback(character, &name).await;
        });

        if let Some(item) = buffered {
            return item;
        }

        // Slow path: the child waits on the remote service here, which is
        // rare when prefetch has kept up
        if let Some(item) = self
            .generate_single_feedback(character, is_correct, child_name)
            .await
        {
            return item;
        }

        let text = if is_correct {
            "Great job!"
        } else {
            "Oops, try again!"
        };
        let audio = self
            .synthesize_speech(character, text)
            .await
            .unwrap_or_default();

        FeedbackItem {
            text: text.to_string(),
            audio,
        }
    }

    /// Generate one (text, audio) encouragement pair. Returns `None` when
    /// either the text generation or the synthesis fails.
    async fn generate_single_feedback(
        &self,
        character: CharacterId,
        is_correct: bool,
        child_name: &str,
    ) -> Option<FeedbackItem> {
        let prompt = feedback_prompt(character, is_correct, child_name);

        let text = match self.generator.generate_text(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => if is_correct { "Yay!" } else { "Oops!" }.to_string(),
            Err(e) => {
                error!("Feedback text generation failed for {character}: {e:?}");
                return None;
            }
        };

        let audio = self.synthesize_speech(character, &text).await?;

        Some(FeedbackItem { text, audio })
    }

    #[cfg(test)]
    pub(crate) async fn buffer_len(&self, character: CharacterId, is_correct: bool) -> usize {
        self.buffers
            .lock()
            .await
            .get(&character)
            .map(|buffer| buffer.len(is_correct))
            .unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) async fn cached_utterances(&self) -> usize {
        self.cache.lock().await.len()
    }
}

/// Build the game-specific prompt and structured-output schema
fn round_request(kind: GameKind, level: u32, history: &[String]) -> (String, Value) {
    let exclude = if history.is_empty() {
        String::new()
    } else {
        format!(
            "IMPORTANT: The target MUST NOT be one of these: {}. Pick a different one.",
            history.join(", ")
        )
    };

    match kind {
        GameKind::NumberJump => (
            format!(
                "Generate a simple counting question for a {} year old.\n\
                 {exclude}\n\
                 Return a target number (1-10) and an array of 8 distractor numbers.\n\
                 Also provide a short encouraging question text like \"Can you find the number 5?\".",
                level + 2
            ),
            json!({
                "type": "OBJECT",
                "properties": {
                    "target": { "type": "NUMBER" },
                    "distractors": { "type": "ARRAY", "items": { "type": "NUMBER" } },
                    "question": { "type": "STRING" },
                },
                "required": ["target", "distractors", "question"],
            }),
        ),
        GameKind::AlphabetCatch => (
            format!(
                "Generate a letter recognition task for a child.\n\
                 {exclude}\n\
                 Return a target letter (A-Z) and a list of 5 distractor letters.\n\
                 Also provide a question text like \"Catch the letter B!\"."
            ),
            json!({
                "type": "OBJECT",
                "properties": {
                    "target": { "type": "STRING" },
                    "distractors": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "question": { "type": "STRING" },
                },
                "required": ["target", "distractors", "question"],
            }),
        ),
        GameKind::ColorMagic => (
            "Generate a color mixing challenge.\n\
             Return a target color name (e.g., Purple, Orange, Green) and the two primary \
             colors needed to make it.\n\
             Available inputs: Red, Blue, Yellow, White.\n\
             Also provide a fun prompt like \"Let's make Purple magic!\"."
                .to_string(),
            json!({
                "type": "OBJECT",
                "properties": {
                    "targetColor": { "type": "STRING" },
                    "requiredMix": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "question": { "type": "STRING" },
                },
                "required": ["targetColor", "requiredMix", "question"],
            }),
        ),
        GameKind::RoboPuzzle => (
            "Generate a very simple logical sequence pattern.\n\
             e.g. ['Red', 'Blue', 'Red', ?] -> Answer 'Blue'.\n\
             Or numbers [1, 2, 1, ?] -> Answer 2.\n\
             Return the sequence array (with '?' as the missing item) and the correct answer.\n\
             Also provide 3 wrong answer options."
                .to_string(),
            json!({
                "type": "OBJECT",
                "properties": {
                    "sequence": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "correctAnswer": { "type": "STRING" },
                    "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "question": { "type": "STRING" },
                },
                "required": ["sequence", "correctAnswer", "options", "question"],
            }),
        ),
    }
}

fn feedback_prompt(character: CharacterId, is_correct: bool, child_name: &str) -> String {
    let profile = character::by_id(character);

    let name_instruction = if child_name.is_empty() {
        String::new()
    } else {
        format!("The child's name is {child_name}. Use it.")
    };

    format!(
        "You are {}, a little friend.\n\
         {name_instruction}\n\
         Child answer was: {}.\n\n\
         Generate a very short, simple, happy phrase (max 6 words).\n\
         Examples Correct: \"Yay! You did it!\", \"Super job [Name]!\", \"Wow, amazing!\"\n\
         Examples Wrong: \"Oopsie!\", \"Try again [Name]!\", \"That's okay!\"\n\n\
         Just the text.",
        profile.name,
        if is_correct { "CORRECT" } else { "WRONG" }
    )
}
