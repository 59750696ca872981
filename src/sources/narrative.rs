use async_trait::async_trait;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::http::{build_client, check_status};
use super::{NarrativeSource, Result, SourceError};
use crate::config::SourcesConfig;

const SYSTEM_PROMPT: &str = "You are Roami, a friendly roadtrip tour guide. \
Describe the place you are asked about in two or three spoken-style sentences: \
what it is, a piece of its history, and why a traveler standing there should care. \
Reply with plain text only.";

/// Narrative generation through an OpenAI-compatible chat-completions endpoint
pub struct ChatNarrativeClient {
    client: ClientWithMiddleware,
    url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ChatNarrativeClient {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            url: config.narrative_url.clone(),
            model: config.narrative_model.clone(),
            api_key: config.narrative_api_key.clone(),
        })
    }

    fn build_request(&self, place_name: &str) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(format!(
                        "Tell me about {place_name}, as if we just arrived there."
                    )),
                },
            ],
            temperature: 0.7,
            max_tokens: 400,
        }
    }

    fn request(&self, place_name: &str) -> RequestBuilder {
        let request = self
            .client
            .post(&self.url)
            .json(&self.build_request(place_name));
        match &self.api_key {
            Some(api_key) => request.bearer_auth(api_key),
            None => request,
        }
    }
}

#[async_trait]
impl NarrativeSource for ChatNarrativeClient {
    #[instrument(skip(self))]
    async fn describe(&self, place_name: &str) -> Result<String> {
        let response = self.request(place_name).send().await?;
        let response = check_status(response, "Narrative service").await?;
        let payload: ChatResponse = response.json().await.map_err(|e| {
            SourceError::Parse(format!("Failed to parse narrative response: {e}"))
        })?;

        let text = first_content(payload).unwrap_or_default();
        debug!("Narrative for '{}' has {} characters", place_name, text.len());
        Ok(text)
    }
}

/// Trimmed content of the first choice, if any
fn first_content(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
}
