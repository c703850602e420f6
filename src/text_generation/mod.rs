//! AI-based text generation module
//!
//! This module provides the language model side of quote identification. It
//! generates prompts asking a model where a quote comes from and sends them
//! to one of several text generation backends.

mod cli;
mod gemini_api;
mod mistral_api;

pub use cli::CliGenerator;
pub use gemini_api::GeminiApiGenerator;
pub use mistral_api::MistralApiGenerator;

use thiserror::Error;

/// Errors that can occur during text generation
#[derive(Debug, Error)]
pub enum TextGenerationError {
    /// Failed to communicate with AI service
    #[error("AI service error: {0}")]
    ServiceError(String),

    /// The service answered, but not in the documented shape
    #[error("Unexpected AI response: {0}")]
    UnexpectedResponse(String),
}

/// Trait for opaque text completion backends
///
/// Implementors take a prompt and return whatever text the model produced.
/// No output format is guaranteed; callers are expected to parse the reply
/// leniently.
pub trait TextGenerator: Send + Sync {
    /// Sends a prompt to the model and returns its raw reply
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached, rejects the
    /// request, or answers without any text.
    fn generate(&self, prompt: &str) -> Result<String, TextGenerationError>;
}

/// Trait for generating prompts that ask a model to identify a quote
pub trait PromptGenerator: Send + Sync {
    /// Generates a prompt for identifying the source of a quote
    ///
    /// # Arguments
    ///
    /// * `quote` - The quote as typed by the user
    ///
    /// # Returns
    ///
    /// A formatted prompt string ready to send to an LLM
    fn generate_quote_prompt(&self, quote: &str) -> String;
}

/// A prompt generator asking for a single JSON object
///
/// The requested keys match what [`crate::hypothesis::parse_response`]
/// understands, including the timecode of the quote within the video.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuotePromptGenerator;

impl PromptGenerator for QuotePromptGenerator {
    fn generate_quote_prompt(&self, quote: &str) -> String {
        let mut prompt = String::new();

        // Add task description
        prompt.push_str("You are an expert on movies and tv series. ");
        prompt.push_str("Identify the movie or tv series the following quote comes from, ");
        prompt.push_str("and the exact timecode at which it is spoken in the full video.\n");
        prompt.push_str("If it is a tv series, also name the season and the episode.\n\n");

        // Add JSON format instructions
        prompt.push_str("Answer ONLY with a JSON object in the following FORMAT:\n");
        prompt.push_str("{\n");
        prompt.push_str("  \"title\": \"Title of the movie or series\",\n");
        prompt.push_str("  \"year\": \"Release year\",\n");
        prompt.push_str("  \"timecode\": \"HH:MM:SS\",\n");
        prompt.push_str("  \"is_series\": true/false,\n");
        prompt.push_str("  \"season\": \"Season number (series only)\",\n");
        prompt.push_str("  \"episode\": \"Episode number (series only)\"\n");
        prompt.push_str("}\n\n");
        prompt.push_str("The timecode MUST use the HH:MM:SS format.\n\n");

        // Add the quote itself
        prompt.push_str(&format!("Quote: \"{}\"", quote));

        prompt
    }
}
