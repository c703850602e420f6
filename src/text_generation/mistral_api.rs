//! Mistral HTTP API text generation
//!
//! Sends prompts as a single user message to the chat completions endpoint.

use super::{TextGenerationError, TextGenerator};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

/// `content` is either a string or a list of typed chunks
#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<Value>,
}

/// Text generator using the Mistral chat completions API
pub struct MistralApiGenerator {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl MistralApiGenerator {
    /// Creates a new Mistral API generator
    ///
    /// # Arguments
    ///
    /// * `api_key` - The Mistral api key, sent as a bearer token
    /// * `base_url` - API root, e.g. `https://api.mistral.ai`
    /// * `model` - Model name, e.g. `mistral-large-latest`
    /// * `timeout` - Upper bound for every request
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TextGenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TextGenerationError::ServiceError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Pulls the reply text out of the first choice
    ///
    /// Chunked content is flattened by concatenating the `text` of each chunk;
    /// any other shape is passed on as its JSON rendering.
    fn extract_text(response: ChatCompletionResponse) -> Result<String, TextGenerationError> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                TextGenerationError::UnexpectedResponse(
                    "Mistral returned no message content".to_string(),
                )
            })?;

        let text = match content {
            Value::String(text) => text,
            Value::Array(chunks) => chunks
                .iter()
                .filter_map(|chunk| chunk.get("text").and_then(Value::as_str))
                .collect(),
            other => other.to_string(),
        };

        Ok(text.trim().to_string())
    }
}

impl TextGenerator for MistralApiGenerator {
    fn generate(&self, prompt: &str) -> Result<String, TextGenerationError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }]
            }))
            .send()
            .map_err(|e| TextGenerationError::ServiceError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TextGenerationError::ServiceError(format!(
                "Mistral API returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| TextGenerationError::UnexpectedResponse(e.to_string()))?;

        Self::extract_text(parsed)
    }
}
