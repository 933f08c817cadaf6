use anyhow::Result;
use buddy_games_rs::content::ContentClient;
use buddy_games_rs::event::{self, EventBus};
use buddy_games_rs::generate::GeminiGenerator;
use buddy_games_rs::playback::{self, AudioQueue};
use buddy_games_rs::sink::StreamSink;
use buddy_games_rs::{config, shell, terminal};
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = config::load().await?;

    let bus = EventBus::new();
    event::debug(&bus);

    let sink = Arc::new(StreamSink::new(config.listen_addr()));
    let queue = AudioQueue::new(sink);
    playback::init(&bus, queue);

    let generator = Arc::new(GeminiGenerator::new(
        config.api_base_url(),
        &config.api_key,
    ));
    let client = ContentClient::new(generator);

    shell::init(
        &bus,
        client,
        config.child_name().to_string(),
        config.level,
    )
    .await;

    terminal::init(&bus);

    info!(
        "buddy-games ready, audio stream on {}. Type !help for commands.",
        config.listen_addr()
    );

    tokio::signal::ctrl_c().await?;

    Ok(())
}
