use crate::generate::DEFAULT_API_BASE_URL;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::fs::read_to_string;

#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    /// API key for the remote generative service
    pub api_key: String,

    /// Override for the generative service endpoint (tests, proxies)
    pub api_base_url: Option<String>,

    /// Child's name, woven into greetings and encouragement phrases
    pub child_name: Option<String>,

    /// Address the audio stream sink listens on
    pub listen_addr: Option<String>,

    /// Difficulty level override; defaults to the persisted shell state
    pub level: Option<u32>,
}

impl Config {
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn child_name(&self) -> &str {
        self.child_name.as_deref().unwrap_or("")
    }

    pub fn listen_addr(&self) -> &str {
        self.listen_addr.as_deref().unwrap_or("127.0.0.1:7878")
    }
}

pub async fn load() -> Result<Config> {
    let config = read_to_string("Config.toml").await?;
    let config: Config = toml::from_str(&config)?;

    Ok(config)
}
