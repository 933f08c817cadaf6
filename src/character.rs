//! Static character roster.
//!
//! Each character fronts one game and maps to a speech synthesis voice.
//! Loaded once at startup, looked up by id.

use crate::round::GameKind;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterId {
    Bunbun,
    Kiko,
    Luna,
    Robo,
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            CharacterId::Bunbun => "bunbun",
            CharacterId::Kiko => "kiko",
            CharacterId::Luna => "luna",
            CharacterId::Robo => "robo",
        };
        write!(f, "{id}")
    }
}

impl FromStr for CharacterId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bunbun" => Ok(CharacterId::Bunbun),
            "kiko" => Ok(CharacterId::Kiko),
            "luna" => Ok(CharacterId::Luna),
            "robo" | "robotiny" => Ok(CharacterId::Robo),
            other => Err(anyhow::anyhow!("Unknown buddy: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Character {
    pub id: CharacterId,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub skill: &'static str,
    /// Prebuilt voice name understood by the speech synthesis capability
    pub voice_name: &'static str,
    pub game: GameKind,
}

lazy_static! {
    pub static ref CHARACTERS: HashMap<CharacterId, Character> = {
        let mut map = HashMap::new();
        map.insert(
            CharacterId::Bunbun,
            Character {
                id: CharacterId::Bunbun,
                name: "BunBun",
                emoji: "🐰",
                description: "I love jumping on numbers!",
                skill: "Numbers & Counting",
                voice_name: "Puck",
                game: GameKind::NumberJump,
            },
        );
        map.insert(
            CharacterId::Kiko,
            Character {
                id: CharacterId::Kiko,
                name: "Kiko",
                emoji: "🐵",
                description: "Let's catch some letters!",
                skill: "Alphabet & Phonics",
                voice_name: "Fenrir",
                game: GameKind::AlphabetCatch,
            },
        );
        map.insert(
            CharacterId::Luna,
            Character {
                id: CharacterId::Luna,
                name: "Luna",
                emoji: "🐱",
                description: "Magic colors are everywhere.",
                skill: "Colors & Creativity",
                voice_name: "Kore",
                game: GameKind::ColorMagic,
            },
        );
        map.insert(
            CharacterId::Robo,
            Character {
                id: CharacterId::Robo,
                name: "RoboTiny",
                emoji: "🤖",
                description: "Beep boop. Logic is fun.",
                skill: "Logic & Puzzles",
                voice_name: "Zephyr",
                game: GameKind::RoboPuzzle,
            },
        );
        map
    };
}

pub fn by_id(id: CharacterId) -> &'static Character {
    CHARACTERS
        .get(&id)
        .expect("Roster contains every CharacterId variant")
}
