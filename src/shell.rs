//! Game shell: orchestrates greetings, score, and outcome reactions.
//!
//! Sits between the front-end events and the content client: starts games,
//! forwards selections to the round controller, reacts to outcomes with
//! encouragement audio, and keeps the star count persisted across runs.

use crate::character::{self, CharacterId};
use crate::constants::NEXT_ROUND_DELAY;
use crate::content::SharedContentClient;
use crate::controller::{RoundController, Verdict};
use crate::event::{Event, EventBus};
use crate::message::MessageAction;
use crate::playback::PlaybackAction;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::sleep;

const SHELL_STATE_FILE: &str = "shell_state.json";
const SHELL_STATE_FILE_TMP: &str = "shell_state.json.tmp";

#[derive(Clone, Debug)]
pub enum ShellAction {
    /// Child picked a buddy; start its game
    StartGame { character: CharacterId },

    /// Child selected a candidate answer
    Select { choice: String },

    /// Speak a line in the current character's voice (manual replay)
    Speak { text: String },

    /// Load the next round (scheduled after success, or manual retry)
    NextRound,

    /// Back to the character roster
    LeaveGame,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ShellState {
    pub stars: u32,
    pub level: u32,
}

impl Default for ShellState {
    fn default() -> Self {
        ShellState { stars: 0, level: 1 }
    }
}

impl ShellState {
    async fn read_or_default() -> Self {
        let res = tokio::fs::read(SHELL_STATE_FILE).await;

        match res {
            Ok(res) => serde_json::from_slice(&res).unwrap_or_default(),
            Err(e) => {
                info!("Error while reading shell state: {:?}", e);
                info!("Falling back to default state.");
                ShellState::default()
            }
        }
    }

    /// Persists state to disk using atomic write (write to temp file, then
    /// rename), so a crash mid-write never leaves a corrupt file.
    fn persist(&self) {
        let json = match serde_json::to_string_pretty(&self) {
            Ok(json) => json,
            Err(e) => {
                error!("Error while serializing shell state: {:?}", e);
                return;
            }
        };

        tokio::spawn(async move {
            if let Err(e) = tokio::fs::write(SHELL_STATE_FILE_TMP, &json).await {
                error!("Error while writing shell state to temp file: {:?}", e);
                return;
            }

            if let Err(e) = tokio::fs::rename(SHELL_STATE_FILE_TMP, SHELL_STATE_FILE).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    error!("Error while renaming shell state file: {:?}", e);
                }
            }
        });
    }
}

pub struct GameShell {
    bus: EventBus,
    client: SharedContentClient,
    child_name: String,
    character: Option<CharacterId>,
    controller: Option<RoundController>,
    pub state: ShellState,
}

impl GameShell {
    pub async fn create(
        bus: EventBus,
        client: SharedContentClient,
        child_name: String,
        level: Option<u32>,
    ) -> GameShell {
        let mut state = ShellState::read_or_default().await;

        if let Some(level) = level {
            state.level = level;
        }

        debug!("Initial shell state:\n{:#?}", state);

        GameShell {
            bus,
            client,
            child_name,
            character: None,
            controller: None,
            state,
        }
    }

    pub fn character(&self) -> Option<CharacterId> {
        self.character
    }

    pub fn controller(&self) -> Option<&RoundController> {
        self.controller.as_ref()
    }

    async fn start_game(&mut self, character: CharacterId) {
        let profile = character::by_id(character);

        info!("Starting {} with {}", profile.game.title(), profile.name);
        self.character = Some(character);

        // Warm the feedback buffers ahead of the first answer
        let client = self.client.clone();
        let name = self.child_name.clone();
        tokio::spawn(async move {
            client.prefetch_feedback(character, &name).await;
        });

        let greeting = if self.child_name.is_empty() {
            format!("Hi! I'm {}. Let's play!", profile.name)
        } else {
            format!("Hi {}! I'm {}. Let's play!", self.child_name, profile.name)
        };

        self.speak_as(character, &greeting).await;

        self.controller = Some(RoundController::new(
            profile.game,
            self.state.level,
            self.client.clone(),
        ));

        self.next_round().await;
    }

    async fn next_round(&mut self) {
        let Some(character) = self.character else {
            return;
        };

        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        if controller.load_round().await {
            let question = controller
                .round()
                .map(|round| round.question().to_string())
                .unwrap_or_default();
            let choices = controller.choices();

            self.bus.send_message(MessageAction::Board {
                question: question.clone(),
                choices,
            });
            self.speak_as(character, &question).await;
        } else {
            self.bus
                .say("Oops, something went wrong. Type !next to try again.");
        }
    }

    async fn select(&mut self, choice: String) {
        let Some(controller) = self.controller.as_mut() else {
            self.bus.say("Pick a buddy first! Type !play <buddy>.");
            return;
        };

        match controller.select(&choice) {
            Verdict::Correct => self.resolve_outcome(true).await,
            Verdict::Incorrect => self.resolve_outcome(false).await,
            Verdict::Pending => {
                self.bus.say(format!("{choice} goes into the pot..."));
            }
            Verdict::NotReady => {
                self.bus.say("Hold on, the round isn't ready yet!");
            }
        }
    }

    async fn resolve_outcome(&mut self, is_correct: bool) {
        let Some(character) = self.character else {
            return;
        };

        if is_correct {
            self.state.stars += 1;
            self.state.persist();
            self.bus.send_message(MessageAction::Stars {
                count: self.state.stars,
            });
        }

        // Immediate audible reaction, from the prefetch buffer when warm
        let feedback = self
            .client
            .get_encouragement(character, is_correct, &self.child_name)
            .await;

        if !feedback.audio.is_empty() {
            self.bus.send(Event::Playback(PlaybackAction::Enqueue {
                audio: feedback.audio,
            }));
        }
        self.bus.say(feedback.text);

        if is_correct {
            // Let the celebration play before the next round loads
            let bus = self.bus.clone();
            tokio::spawn(async move {
                sleep(NEXT_ROUND_DELAY).await;
                bus.send(Event::Shell(ShellAction::NextRound));
            });
        }
    }

    async fn speak(&self, text: &str) {
        match self.character {
            Some(character) => self.speak_as(character, text).await,
            None => self.bus.say("Pick a buddy first! Type !play <buddy>."),
        }
    }

    async fn speak_as(&self, character: CharacterId, text: &str) {
        let profile = character::by_id(character);
        self.bus
            .send_message(MessageAction::say(format!("{} {text}", profile.emoji)));

        match self.client.synthesize_speech(character, text).await {
            Some(audio) => {
                self.bus
                    .send(Event::Playback(PlaybackAction::Enqueue { audio }));
            }
            None => {
                // The child just misses one spoken line; the text is shown
                warn!("No audio for line: {text}");
            }
        }
    }

    fn leave_game(&mut self) {
        if let Some(character) = self.character.take() {
            let profile = character::by_id(character);
            self.bus
                .say(format!("{} waves goodbye. Pick another buddy!", profile.name));
        }
        self.controller = None;
    }
}

/// Type alias for shared shell state
pub type SharedShell = Arc<RwLock<GameShell>>;

pub async fn init(
    bus: &EventBus,
    client: SharedContentClient,
    child_name: String,
    level: Option<u32>,
) -> SharedShell {
    let shell = Arc::new(RwLock::new(
        GameShell::create(bus.clone(), client, child_name, level).await,
    ));

    handle_incoming_event_loop(bus.clone(), shell.clone());

    shell
}

fn handle_incoming_event_loop(bus: EventBus, shell: SharedShell) {
    // Subscribe before spawning so events sent right after init() returns
    // are not lost while the task waits for its first poll.
    let mut bus_rx = bus.subscribe();

    tokio::spawn(async move {
        loop {
            let event = bus_rx.recv().await;

            if let Event::Shell(action) = event {
                let shell = shell.clone();
                tokio::spawn(async move {
                    handle_incoming_event(action, shell).await;
                });
            }
        }
    });
}

async fn handle_incoming_event(action: ShellAction, shell: SharedShell) {
    let mut shell = shell.write().await;
    match action {
        ShellAction::StartGame { character } => shell.start_game(character).await,
        ShellAction::Select { choice } => shell.select(choice).await,
        ShellAction::Speak { text } => shell.speak(&text).await,
        ShellAction::NextRound => shell.next_round().await,
        ShellAction::LeaveGame => shell.leave_game(),
    }
}
