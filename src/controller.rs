//! Per-game round controller.
//!
//! Drives one round at a time: requests a round from the content client,
//! tracks the rolling target history, and evaluates the child's picks.
//! `Loading -> Ready -> (resolved) -> Loading` with an explicit `Error`
//! phase when no round could be produced (retryable, never silently
//! stuck).

use crate::constants::ROUND_HISTORY_LEN;
use crate::content::SharedContentClient;
use crate::round::{GameKind, GameRound};
use rand::seq::SliceRandom;
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Error,
}

/// Outcome of a single selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// Multi-pick round still accumulating selections
    Pending,
    /// No round is ready to evaluate against
    NotReady,
}

pub struct RoundController {
    kind: GameKind,
    level: u32,
    client: SharedContentClient,
    phase: Phase,
    round: Option<GameRound>,
    /// Recently seen targets, oldest first, capped at [ROUND_HISTORY_LEN].
    /// Passed to generation as an exclusion hint; the remote service may
    /// still repeat a target and that is tolerated.
    history: VecDeque<String>,
    /// Partial selection for multi-pick rounds
    picks: Vec<String>,
}

impl RoundController {
    pub fn new(kind: GameKind, level: u32, client: SharedContentClient) -> Self {
        Self {
            kind,
            level,
            client,
            phase: Phase::Loading,
            round: None,
            history: VecDeque::new(),
            picks: Vec::new(),
        }
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> Option<&GameRound> {
        self.round.as_ref()
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Request the next round. Returns `true` when a round is ready.
    pub async fn load_round(&mut self) -> bool {
        self.phase = Phase::Loading;
        self.picks.clear();

        let history: Vec<String> = self.history.iter().cloned().collect();

        match self
            .client
            .generate_round(self.kind, self.level, &history)
            .await
        {
            Some(round) => {
                info!("Loaded {:?} round: {}", self.kind, round.question());
                self.push_history(round.target_key());
                self.round = Some(round);
                self.phase = Phase::Ready;
                true
            }
            None => {
                warn!("No round available for {:?}", self.kind);
                self.round = None;
                self.phase = Phase::Error;
                false
            }
        }
    }

    fn push_history(&mut self, target: String) {
        self.history.push_back(target);
        while self.history.len() > ROUND_HISTORY_LEN {
            self.history.pop_front();
        }
    }

    /// Candidate answers for the current round, reshuffled on every call.
    /// Membership is stable; only the order varies (accepted cosmetic
    /// inconsistency).
    pub fn choices(&self) -> Vec<String> {
        let mut choices = self
            .round
            .as_ref()
            .map(GameRound::choices)
            .unwrap_or_default();
        choices.shuffle(&mut rand::rng());
        choices
    }

    /// Evaluate one selected candidate.
    ///
    /// Single-pick rounds resolve immediately. The color round accumulates
    /// picks until the required count is reached, then evaluates the whole
    /// multiset and clears the partial selection. A wrong answer leaves
    /// the controller in `Ready` with the same round so the child can try
    /// again.
    pub fn select(&mut self, choice: &str) -> Verdict {
        if self.phase != Phase::Ready {
            return Verdict::NotReady;
        }

        let Some(round) = &self.round else {
            return Verdict::NotReady;
        };

        match round {
            GameRound::Color(color) => {
                self.picks.push(choice.to_string());

                if self.picks.len() < color.required_mix.len() {
                    return Verdict::Pending;
                }

                let correct = color.check_mix(&self.picks);
                self.picks.clear();

                if correct {
                    Verdict::Correct
                } else {
                    Verdict::Incorrect
                }
            }
            _ => {
                if round.matches_target(choice) {
                    Verdict::Correct
                } else {
                    Verdict::Incorrect
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_round_for_test(&mut self, round: GameRound) {
        self.round = Some(round);
        self.phase = Phase::Ready;
        self.picks.clear();
    }
}
