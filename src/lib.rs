//! QuoteDetective - Identify the movie or tv episode behind a quote
//!
//! This library takes a remembered line of dialogue, asks a language model
//! where it is from, cross-checks the answer against a movie catalog and
//! finds a video clip that starts at the right moment.

pub mod config;
pub mod enrichment;
pub mod hypothesis;
pub mod match_selector;
pub mod metadata_retrieval;
pub mod pipeline;
pub mod player;
pub mod resolved_media;
pub mod server;
pub mod text_generation;
pub mod timecode;
pub mod video_search;

// Re-export error types
pub use config::ConfigError;
pub use metadata_retrieval::MetadataRetrievalError;
pub use player::PlayerError;
pub use text_generation::TextGenerationError;
pub use video_search::VideoSearchError;

// Re-export the main entry points
pub use config::{Config, GeneratorKind};
pub use pipeline::{ProgressEvent, QuotePipeline, TimecodeSource};
pub use resolved_media::ResolvedMedia;
pub use video_search::{VideoRecord, VideoSearch};

use std::io;
use thiserror::Error;

/// Top-level error type for QuoteDetective operations
#[derive(Debug, Error)]
pub enum QuoteDetectiveError {
    /// Error in the runtime configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error while generating a hypothesis
    #[error("Text generation error: {0}")]
    TextGeneration(#[from] TextGenerationError),

    /// Error during metadata retrieval
    #[error("Metadata retrieval error: {0}")]
    MetadataRetrieval(#[from] MetadataRetrievalError),

    /// Error during video search
    #[error("Video search error: {0}")]
    VideoSearch(#[from] VideoSearchError),

    /// A required input was empty or missing
    #[error("{0} is required")]
    EmptyInput(&'static str),

    /// A component needed for the request was not configured
    #[error("{0} is not configured")]
    Unavailable(&'static str),

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
