//! The resolved result record
//!
//! A [`MediaDraft`] is filled stage by stage while a quote is being resolved.
//! Once the timecode is settled it is sealed into a [`ResolvedMedia`], whose
//! timecode is guaranteed to be present.

use crate::hypothesis::{EpisodeRef, QuoteHypothesis};
use crate::metadata_retrieval::MediaType;
use serde::Serialize;

/// The final identification of a quote
///
/// Absent fields are omitted from the serialized JSON instead of being
/// written as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMedia {
    /// Title as known to the catalog, else as guessed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Release year, four digits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Plot summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Absolute poster image url
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    /// TMDB id of the matched entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<u64>,
    /// Movie or series
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// Whether the quote comes from a series
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_series: Option<bool>,
    /// Season of the episode, series only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<EpisodeRef>,
    /// Episode number or label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<EpisodeRef>,
    /// Director, or creator for series
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    /// Leading cast, at most five names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actors: Option<Vec<String>>,
    /// Position of the quote, always `HH:MM:SS`
    pub timecode: String,
}

/// A partially resolved record, filled while the pipeline runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDraft {
    pub title: Option<String>,
    pub year: Option<String>,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub catalog_id: Option<u64>,
    pub media_type: Option<MediaType>,
    pub is_series: Option<bool>,
    pub season: Option<EpisodeRef>,
    pub episode: Option<EpisodeRef>,
    pub director: Option<String>,
    pub actors: Option<Vec<String>>,
    pub timecode: Option<String>,
}

impl From<QuoteHypothesis> for MediaDraft {
    fn from(hypothesis: QuoteHypothesis) -> Self {
        Self {
            title: hypothesis.title,
            year: hypothesis.year,
            is_series: hypothesis.is_series,
            season: hypothesis.season,
            episode: hypothesis.episode,
            timecode: hypothesis.timecode,
            ..Default::default()
        }
    }
}

impl MediaDraft {
    /// Seals the draft with its final timecode
    pub fn finish(self, timecode: String) -> ResolvedMedia {
        ResolvedMedia {
            title: self.title,
            year: self.year,
            overview: self.overview,
            poster_url: self.poster_url,
            catalog_id: self.catalog_id,
            media_type: self.media_type,
            is_series: self.is_series,
            season: self.season,
            episode: self.episode,
            director: self.director,
            actors: self.actors,
            timecode,
        }
    }
}
