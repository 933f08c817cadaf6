//! Session-lifetime cache of synthesized speech.
//!
//! Keyed by `(character, exact text)` with no normalization, so case or
//! whitespace variants are distinct utterances (known limitation, accepted
//! because the phrase vocabulary is small). Entries are never evicted.

use crate::character::CharacterId;
use std::collections::HashMap;

#[derive(Default)]
pub struct SpeechCache {
    entries: HashMap<(CharacterId, String), String>,
}

impl SpeechCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, character: CharacterId, text: &str) -> Option<String> {
        self.entries.get(&(character, text.to_string())).cloned()
    }

    /// Write-once per key; a later insert for the same key is redundant
    /// but harmless
    pub fn insert(&mut self, character: CharacterId, text: &str, audio: String) {
        self.entries.insert((character, text.to_string()), audio);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
