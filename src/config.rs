//! Runtime configuration
//!
//! All provider endpoints, credentials and tuning knobs live in one
//! [`Config`]. The binary fills it from command line arguments and the
//! environment; tests construct it directly, pointing the base urls at mock
//! servers.

use crate::match_selector::SelectionPolicy;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default upper bound for every outbound request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors in the runtime configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider was requested but its api key is missing
    #[error("Missing api key: set {0}")]
    MissingApiKey(&'static str),

    /// The timeout must allow at least one second
    #[error("Request timeout must be at least one second")]
    InvalidTimeout,
}

/// The backend used to generate quote hypotheses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Google Gemini HTTP API
    #[default]
    Gemini,
    /// Mistral chat completions HTTP API
    Mistral,
    /// Locally installed Gemini CLI
    GeminiCli,
    /// Locally installed Claude Code CLI
    ClaudeCli,
}

impl FromStr for GeneratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(GeneratorKind::Gemini),
            "mistral" => Ok(GeneratorKind::Mistral),
            "gemini-cli" => Ok(GeneratorKind::GeminiCli),
            "claude-cli" | "claude" => Ok(GeneratorKind::ClaudeCli),
            other => Err(format!(
                "unknown generator '{}', expected gemini, mistral, gemini-cli or claude-cli",
                other
            )),
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeneratorKind::Gemini => "gemini",
            GeneratorKind::Mistral => "mistral",
            GeneratorKind::GeminiCli => "gemini-cli",
            GeneratorKind::ClaudeCli => "claude-cli",
        };
        f.write_str(name)
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "year-aware" => Ok(SelectionPolicy::YearAware),
            "type-and-title" => Ok(SelectionPolicy::TypeAndTitle),
            other => Err(format!(
                "unknown selection policy '{}', expected year-aware or type-and-title",
                other
            )),
        }
    }
}

/// Provider endpoints, credentials and tuning knobs
#[derive(Debug, Clone)]
pub struct Config {
    pub generator: GeneratorKind,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub mistral_api_key: Option<String>,
    pub mistral_base_url: String,
    pub mistral_model: String,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    /// Base url relative poster paths are joined to
    pub tmdb_image_base_url: String,
    pub youtube_api_key: Option<String>,
    pub youtube_base_url: String,
    /// Upper bound for every outbound call, CLI generators included
    pub request_timeout: Duration,
    pub selection_policy: SelectionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generator: GeneratorKind::default(),
            gemini_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            mistral_api_key: None,
            mistral_base_url: "https://api.mistral.ai".to_string(),
            mistral_model: "mistral-large-latest".to_string(),
            tmdb_api_key: None,
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            tmdb_image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            youtube_api_key: None,
            youtube_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            selection_policy: SelectionPolicy::default(),
        }
    }
}

impl Config {
    /// Checks settings that would make every request fail
    ///
    /// Missing api keys are not checked here: the resolution pipeline runs
    /// degraded without them, and video search reports them when built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout < Duration::from_secs(1) {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}
