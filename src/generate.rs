//! Remote generative capability.
//!
//! The [Generator] trait is the only seam to the remote service: freeform
//! text, schema-conforming structured output, and speech synthesis. The
//! production implementation talks to the Gemini `generateContent` REST
//! endpoint; tests substitute fakes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate freeform text from a natural-language instruction
    async fn generate_text(&self, prompt: &str) -> Result<String>;

    /// Generate a structured result conforming to `schema`
    async fn generate_structured(&self, prompt: &str, schema: Value) -> Result<Value>;

    /// Synthesize speech for `text` with the given prebuilt voice.
    /// Returns a base64-encoded raw 16-bit mono PCM payload at 24 kHz.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<String>;
}

pub struct GeminiGenerator {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn generate_content(&self, model: &str, body: Value) -> Result<Value> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Generation request failed")?
            .error_for_status()
            .context("Generation request rejected")?;

        let value = response
            .json::<Value>()
            .await
            .context("Generation response was not JSON")?;

        Ok(value)
    }
}

/// Extract the first candidate's text part from a generateContent response
fn extract_text(response: &Value) -> Result<String> {
    let text = response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .context("Generation response contained no text part")?;

    Ok(text.to_string())
}

/// Extract the first candidate's inline audio payload
fn extract_audio(response: &Value) -> Result<String> {
    let data = response
        .pointer("/candidates/0/content/parts/0/inlineData/data")
        .and_then(Value::as_str)
        .context("Synthesis response contained no audio payload")?;

    Ok(data.to_string())
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self.generate_content(TEXT_MODEL, body).await?;

        extract_text(&response)
    }

    async fn generate_structured(&self, prompt: &str, schema: Value) -> Result<Value> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });

        let response = self.generate_content(TEXT_MODEL, body).await?;
        let text = extract_text(&response)?;

        serde_json::from_str(&text).context("Structured response was not valid JSON")
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice },
                    },
                },
            },
        });

        let response = self.generate_content(TTS_MODEL, body).await?;

        extract_audio(&response)
    }
}
