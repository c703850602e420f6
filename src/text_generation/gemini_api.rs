//! Gemini HTTP API text generation
//!
//! Sends prompts to the `generateContent` endpoint of the Google Generative
//! Language API.

use super::{TextGenerationError, TextGenerator};
use serde::Deserialize;
use std::time::Duration;

/// Response of the `generateContent` endpoint
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

/// Text generator using the Gemini HTTP API
pub struct GeminiApiGenerator {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiApiGenerator {
    /// Creates a new Gemini API generator
    ///
    /// # Arguments
    ///
    /// * `api_key` - The Gemini api key
    /// * `base_url` - API root, e.g. `https://generativelanguage.googleapis.com`
    /// * `model` - Model name, e.g. `gemini-1.5-flash`
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

    /// Concatenates the text parts of the first candidate
    fn extract_text(response: GenerateContentResponse) -> Result<String, TextGenerationError> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(TextGenerationError::UnexpectedResponse(
                "Gemini returned no text".to_string(),
            ));
        }

        Ok(text.trim().to_string())
    }
}

impl TextGenerator for GeminiApiGenerator {
    fn generate(&self, prompt: &str) -> Result<String, TextGenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .map_err(|e| TextGenerationError::ServiceError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TextGenerationError::ServiceError(format!(
                "Gemini API returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| TextGenerationError::UnexpectedResponse(e.to_string()))?;

        Self::extract_text(parsed)
    }
}
