/// Data structures and traits for movie and tv series catalog retrieval.
///
/// This module provides structures to represent catalog search candidates and
/// their supplementary details (cast, directors, synopsis), as well as the
/// trait for implementing catalog providers.
mod tmdb;
mod tmdb_types;

pub use tmdb::TmdbProvider;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during catalog retrieval operations.
#[derive(Debug, Error)]
pub enum MetadataRetrievalError {
    /// Request to the catalog provider failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Failed to parse the provider's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The requested catalog entry was not found
    #[error("Catalog entry not found: {0}")]
    NotFound(String),
}

/// The kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// A feature film
    Movie,
    /// A tv series
    Series,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => f.write_str("movie"),
            MediaType::Series => f.write_str("series"),
        }
    }
}

/// A single search result from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCandidate {
    /// The catalog identifier
    pub id: u64,
    /// Whether this entry is a movie or a series
    pub media_type: MediaType,
    /// Movie title or series name
    pub title: String,
    /// Short synopsis
    pub overview: Option<String>,
    /// Relative poster path, to be joined with the image base url
    pub poster_path: Option<String>,
    /// Release date of a movie or first air date of a series (`YYYY-MM-DD`)
    pub release_date: Option<String>,
}

impl CatalogCandidate {
    /// Returns the release year, i.e. the part of the date before the first `-`
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .filter(|year| !year.is_empty())
    }
}

/// Supplementary details for a selected catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogDetail {
    /// Extended synopsis
    pub overview: Option<String>,
    /// Release date or first air date
    pub release_date: Option<String>,
    /// Directors for movies, creators for series
    pub directors: Vec<String>,
    /// Cast names in billing order
    pub cast: Vec<String>,
}

/// Trait for catalog providers that can search movies and tv series.
///
/// Implementors of this trait can retrieve metadata from sources such as
/// TMDB or other movie databases.
pub trait CatalogProvider: Send + Sync {
    /// Searches the catalog for movies and series matching a title.
    ///
    /// # Arguments
    ///
    /// * `title` - The title to search for, must not be empty
    ///
    /// # Returns
    ///
    /// The candidates in the provider's native ordering. Entries that are
    /// neither movies nor series are excluded.
    fn search(&self, title: &str) -> Result<Vec<CatalogCandidate>, MetadataRetrievalError>;

    /// Fetches supplementary details for a catalog entry.
    ///
    /// # Arguments
    ///
    /// * `id` - The catalog identifier of the entry
    /// * `media_type` - Selects the movie or series detail endpoint
    fn details(
        &self,
        id: u64,
        media_type: MediaType,
    ) -> Result<CatalogDetail, MetadataRetrievalError>;
}
