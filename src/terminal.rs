//! Terminal front-end.
//!
//! Stands in for the visual component tree: reads commands from stdin and
//! forwards exactly the UI events the core expects ("start a game",
//! "selected candidate X", "speak this text"), and prints display actions
//! coming back over the bus. Every input line also resumes the audio
//! output, mirroring resume-on-user-interaction.

use crate::character::{CharacterId, CHARACTERS};
use crate::event::{Event, EventBus};
use crate::message::MessageAction;
use crate::playback::PlaybackAction;
use crate::shell::ShellAction;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP_TEXT: &str = r#"
===================================================================
Commands:
Pick a buddy and start their game:   !play <buddy>
Pick an answer:                      !pick <answer>
Mix colors (Luna's game):            !pick Red, then !pick Blue
Hear a line again:                   !speak <text>
Next round / retry:                  !next
List the buddies:                    !buddies
Back to the roster:                  !back
This help:                           !help
==================================================================="#;

pub fn init(bus: &EventBus) {
    start_input_loop(bus.clone());
    start_display_loop(bus.clone());
}

fn start_display_loop(bus: EventBus) {
    tokio::spawn(async move {
        let mut subscriber = bus.subscribe();

        loop {
            if let Event::Message(action) = subscriber.recv().await {
                match action {
                    MessageAction::Say { text } => println!("{text}"),
                    MessageAction::Board { question, choices } => {
                        println!();
                        println!("  {question}");
                        println!("  [{}]", choices.join("] ["));
                    }
                    MessageAction::Stars { count } => println!("  ⭐ x{count}"),
                }
            }
        }
    });
}

fn start_input_loop(bus: EventBus) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Any interaction may unblock a suspended output device
            bus.send(Event::Playback(PlaybackAction::Resume));

            let (command, rest) = match line.split_once(' ') {
                Some((command, rest)) => (command, rest.trim()),
                None => (line, ""),
            };

            match command {
                "!play" => match rest.parse::<CharacterId>() {
                    Ok(character) => {
                        bus.send(Event::Shell(ShellAction::StartGame { character }));
                    }
                    Err(e) => println!("{e}. Try !buddies."),
                },
                "!pick" if !rest.is_empty() => {
                    bus.send(Event::Shell(ShellAction::Select {
                        choice: rest.to_string(),
                    }));
                }
                "!speak" if !rest.is_empty() => {
                    bus.send(Event::Shell(ShellAction::Speak {
                        text: rest.to_string(),
                    }));
                }
                "!next" => bus.send(Event::Shell(ShellAction::NextRound)),
                "!back" => bus.send(Event::Shell(ShellAction::LeaveGame)),
                "!buddies" => {
                    for character in CHARACTERS.values() {
                        println!(
                            "  {} {} ({}) - {} [{}]",
                            character.emoji,
                            character.name,
                            character.id,
                            character.description,
                            character.skill
                        );
                    }
                }
                "!help" => println!("{HELP_TEXT}"),
                _ => println!("Unknown command, try !help"),
            }
        }
    });
}
