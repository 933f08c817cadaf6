//! Typed game rounds.
//!
//! The remote generative service returns schema-conforming JSON per game
//! kind. Responses are decoded into a tagged union and validated at the
//! content client boundary so malformed records never reach presentation
//! code.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paint buckets available in the color mixing game
pub const COLOR_PALETTE: [&str; 4] = ["Red", "Blue", "Yellow", "White"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    NumberJump,
    AlphabetCatch,
    ColorMagic,
    RoboPuzzle,
}

impl GameKind {
    pub fn title(&self) -> &'static str {
        match self {
            GameKind::NumberJump => "Number Jump",
            GameKind::AlphabetCatch => "Alphabet Catch",
            GameKind::ColorMagic => "Color Magic",
            GameKind::RoboPuzzle => "Robo Puzzle",
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NumberRound {
    pub target: u32,
    pub distractors: Vec<u32>,
    pub question: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LetterRound {
    pub target: String,
    pub distractors: Vec<String>,
    pub question: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColorRound {
    pub target_color: String,
    pub required_mix: Vec<String>,
    pub question: String,
}

impl ColorRound {
    /// Evaluate a completed set of picks against the required mix.
    ///
    /// Order-independent exact-size multiset match: `[Blue, Red]` satisfies
    /// `{Red, Blue}` but `[Red, Red]` does not.
    pub fn check_mix(&self, picks: &[String]) -> bool {
        if picks.len() != self.required_mix.len() {
            return false;
        }

        let mut picked: Vec<&str> = picks.iter().map(String::as_str).collect();
        let mut required: Vec<&str> = self.required_mix.iter().map(String::as_str).collect();
        picked.sort_unstable();
        required.sort_unstable();

        picked == required
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternRound {
    /// Sequence with "?" marking the missing item
    pub sequence: Vec<String>,
    pub correct_answer: String,
    pub options: Vec<String>,
    pub question: String,
}

/// One round of a game: a prompt, a target and its distractors.
#[derive(Clone, Debug, PartialEq)]
pub enum GameRound {
    Number(NumberRound),
    Letter(LetterRound),
    Color(ColorRound),
    Pattern(PatternRound),
}

impl GameRound {
    /// Decode and validate a schema-conforming JSON response for `kind`.
    pub fn from_value(kind: GameKind, value: Value) -> Result<GameRound> {
        let round = match kind {
            GameKind::NumberJump => GameRound::Number(serde_json::from_value(value)?),
            GameKind::AlphabetCatch => GameRound::Letter(serde_json::from_value(value)?),
            GameKind::ColorMagic => GameRound::Color(serde_json::from_value(value)?),
            GameKind::RoboPuzzle => GameRound::Pattern(serde_json::from_value(value)?),
        };

        round.validate()?;

        Ok(round)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.question().trim().is_empty(), "Round has no question");

        match self {
            GameRound::Number(round) => {
                ensure!(
                    !round.distractors.is_empty(),
                    "Number round has no distractors"
                );
            }
            GameRound::Letter(round) => {
                ensure!(!round.target.is_empty(), "Letter round has no target");
                ensure!(
                    !round.distractors.is_empty(),
                    "Letter round has no distractors"
                );
            }
            GameRound::Color(round) => {
                ensure!(
                    !round.target_color.is_empty(),
                    "Color round has no target color"
                );
                ensure!(
                    round.required_mix.len() >= 2,
                    "Color round needs at least two mix colors"
                );
            }
            GameRound::Pattern(round) => {
                ensure!(!round.sequence.is_empty(), "Pattern round has no sequence");
                ensure!(
                    !round.correct_answer.is_empty(),
                    "Pattern round has no answer"
                );
                ensure!(!round.options.is_empty(), "Pattern round has no options");
            }
        }

        Ok(())
    }

    pub fn question(&self) -> &str {
        match self {
            GameRound::Number(round) => &round.question,
            GameRound::Letter(round) => &round.question,
            GameRound::Color(round) => &round.question,
            GameRound::Pattern(round) => &round.question,
        }
    }

    /// Key used in the rolling history that biases generation away from
    /// recently seen targets
    pub fn target_key(&self) -> String {
        match self {
            GameRound::Number(round) => round.target.to_string(),
            GameRound::Letter(round) => round.target.clone(),
            GameRound::Color(round) => round.target_color.clone(),
            GameRound::Pattern(round) => round.correct_answer.clone(),
        }
    }

    /// The presented candidate set (target mixed with distractors),
    /// in a stable unshuffled order
    pub fn choices(&self) -> Vec<String> {
        match self {
            GameRound::Number(round) => {
                let mut choices: Vec<String> =
                    round.distractors.iter().map(u32::to_string).collect();
                choices.push(round.target.to_string());
                choices
            }
            GameRound::Letter(round) => {
                let mut choices = round.distractors.clone();
                choices.push(round.target.clone());
                choices
            }
            // The color board always shows the full palette
            GameRound::Color(_) => COLOR_PALETTE.iter().map(|c| c.to_string()).collect(),
            GameRound::Pattern(round) => {
                let mut choices = round.options.clone();
                choices.push(round.correct_answer.clone());
                choices
            }
        }
    }

    /// How many picks a selection needs before it can be evaluated
    pub fn required_picks(&self) -> usize {
        match self {
            GameRound::Color(round) => round.required_mix.len(),
            _ => 1,
        }
    }

    /// Evaluate a single-pick selection. Color rounds are multi-pick and
    /// evaluated through [ColorRound::check_mix] instead.
    pub fn matches_target(&self, choice: &str) -> bool {
        match self {
            GameRound::Number(round) => choice == round.target.to_string(),
            GameRound::Letter(round) => choice == round.target,
            GameRound::Color(round) => choice == round.target_color,
            GameRound::Pattern(round) => choice == round.correct_answer,
        }
    }
}

/// Fixed default round used when generation fails for the numeric game
pub fn fallback_number_round() -> GameRound {
    GameRound::Number(NumberRound {
        target: 5,
        distractors: vec![1, 2, 3, 4, 6, 7, 8, 9],
        question: "Find 5!".to_string(),
    })
}
