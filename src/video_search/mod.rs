//! Video search module
//!
//! Finds clips of a resolved quote on a video platform. Searching is a
//! two-step affair: a keyword search yields video ids, and a batch detail
//! call fills in duration, statistics and thumbnails. Unlike the catalog
//! stages, failures here are reported to the caller since there is no
//! fallback content to show instead.

mod youtube;
mod youtube_types;

pub use youtube::YouTubeProvider;

use crate::config::{Config, ConfigError};
use crate::resolved_media::ResolvedMedia;
use crate::timecode::coerce;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during video search
#[derive(Debug, Error)]
pub enum VideoSearchError {
    /// Request to the video provider failed
    #[error("Video search request failed: {0}")]
    RequestError(String),

    /// The provider rejected the request
    #[error("Video provider returned HTTP {status}: {message}")]
    ProviderError { status: u16, message: String },

    /// Failed to parse the provider's JSON response
    #[error("Failed to parse video provider response: {0}")]
    ParseError(String),
}

/// Video metadata as reported by the provider's detail call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetail {
    /// Provider video id
    pub id: String,
    /// Video title
    pub title: String,
    /// Video description
    pub description: String,
    /// Best available thumbnail
    pub thumbnail_url: Option<String>,
    /// Uploading channel
    pub channel_title: String,
    /// ISO 8601 duration, e.g. `PT4M13S`
    pub duration: String,
    /// Absent when the uploader hides statistics
    pub view_count: Option<u64>,
    /// RFC 3339 upload timestamp
    pub published_at: String,
}

/// What an embedded player needs to start at the right moment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedDescriptor {
    /// Video to load
    pub video_id: String,
    /// Offset playback starts at, `0` for the beginning
    pub start_seconds: u64,
}

/// A video search result, ready to be shown and played
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Provider video id
    pub id: String,
    /// Video title
    pub title: String,
    /// Video description, possibly empty
    pub description: String,
    /// Thumbnail url, omitted when the provider has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Uploading channel
    pub channel_title: String,
    /// Length as reported, e.g. `PT2M31S`
    pub duration_iso8601: String,
    /// View count, omitted when hidden
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    /// Upload timestamp
    pub published_at: String,
    /// Embed url carrying the `start` offset when non-zero
    pub embed_url: String,
    /// Player parameters for the same start offset
    pub embed_descriptor: EmbedDescriptor,
}

impl VideoRecord {
    /// Builds a record from provider details, starting playback at `start_seconds`
    pub fn from_detail(detail: VideoDetail, start_seconds: u64) -> Self {
        let embed_url = if start_seconds > 0 {
            format!(
                "https://www.youtube.com/embed/{}?start={}",
                detail.id, start_seconds
            )
        } else {
            format!("https://www.youtube.com/embed/{}", detail.id)
        };

        Self {
            embed_descriptor: EmbedDescriptor {
                video_id: detail.id.clone(),
                start_seconds,
            },
            id: detail.id,
            title: detail.title,
            description: detail.description,
            thumbnail_url: detail.thumbnail_url,
            channel_title: detail.channel_title,
            duration_iso8601: detail.duration,
            view_count: detail.view_count,
            published_at: detail.published_at,
            embed_url,
        }
    }
}

/// Trait for video platforms that can be searched for clips
///
/// The two calls form one contract: ids returned by
/// [`VideoProvider::search_ids`] feed [`VideoProvider::video_details`].
pub trait VideoProvider: Send + Sync {
    /// Runs a keyword search and returns matching video ids in ranking order
    fn search_ids(&self, query: &str) -> Result<Vec<String>, VideoSearchError>;

    /// Fetches details for a batch of video ids
    fn video_details(&self, ids: &[String]) -> Result<Vec<VideoDetail>, VideoSearchError>;
}

/// Builds the search query for a quote
///
/// # Examples
///
/// ```
/// use quote_detective::video_search::build_video_query;
///
/// assert_eq!(
///     build_video_query(Some("Heat"), "Don't let yourself get attached"),
///     "Heat movie scene \"Don't let yourself get attached\""
/// );
/// assert_eq!(build_video_query(None, "Hi"), "movie scene \"Hi\"");
/// ```
pub fn build_video_query(title: Option<&str>, quote: &str) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("{} movie scene \"{}\"", title, quote),
        None => format!("movie scene \"{}\"", quote),
    }
}

/// Video search adapter on top of a [`VideoProvider`]
pub struct VideoSearch {
    provider: Box<dyn VideoProvider>,
}

impl VideoSearch {
    /// Creates a new adapter for the given provider
    pub fn new(provider: Box<dyn VideoProvider>) -> Self {
        Self { provider }
    }

    /// Creates a YouTube backed adapter from the runtime configuration
    ///
    /// Unlike the resolution pipeline there is nothing to degrade to, so a
    /// missing api key is an error.
    pub fn from_config(config: &Config) -> Result<Self, crate::QuoteDetectiveError> {
        config.validate()?;
        let api_key = config
            .youtube_api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey("YOUTUBE_API_KEY"))?;
        let provider = YouTubeProvider::new(
            api_key,
            config.youtube_base_url.as_str(),
            config.request_timeout,
        )?;
        Ok(Self::new(Box::new(provider)))
    }

    /// Searches videos for a ready-made query
    ///
    /// # Arguments
    ///
    /// * `query` - The search query
    /// * `timecode` - Optional timecode used as the start offset of every result
    ///
    /// # Returns
    ///
    /// The matching videos; an empty list means nothing was found and is not
    /// an error.
    pub fn search_videos_for_query(
        &self,
        query: &str,
        timecode: Option<&str>,
    ) -> Result<Vec<VideoRecord>, VideoSearchError> {
        let ids = self.provider.search_ids(query)?;
        if ids.is_empty() {
            debug!(query, "Video search returned no results");
            return Ok(Vec::new());
        }

        let start_seconds = timecode.map(|t| coerce(t)).unwrap_or(0);
        let details = self.provider.video_details(&ids)?;

        Ok(details
            .into_iter()
            .map(|detail| VideoRecord::from_detail(detail, start_seconds))
            .collect())
    }

    /// Searches clips for a resolved quote
    ///
    /// The query combines the resolved title (if any) with the original quote,
    /// and playback starts at the resolved timecode.
    pub fn find_clip(
        &self,
        media: &ResolvedMedia,
        quote: &str,
    ) -> Result<Vec<VideoRecord>, VideoSearchError> {
        let query = build_video_query(media.title.as_deref(), quote);
        self.search_videos_for_query(&query, Some(&media.timecode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Provider returning canned data
    struct StubProvider {
        ids: Vec<String>,
    }

    impl StubProvider {
        fn new(ids: &[&str]) -> Self {
            Self {
                ids: ids.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl VideoProvider for StubProvider {
        fn search_ids(&self, _query: &str) -> Result<Vec<String>, VideoSearchError> {
            Ok(self.ids.clone())
        }

        fn video_details(&self, ids: &[String]) -> Result<Vec<VideoDetail>, VideoSearchError> {
            assert!(!ids.is_empty(), "details requested for an empty search");
            Ok(ids
                .iter()
                .map(|id| VideoDetail {
                    id: id.clone(),
                    title: format!("Clip {}", id),
                    description: String::new(),
                    thumbnail_url: None,
                    channel_title: "Movieclips".to_string(),
                    duration: "PT2M".to_string(),
                    view_count: Some(10),
                    published_at: "2020-01-01T00:00:00Z".to_string(),
                })
                .collect())
        }
    }

    struct FailingProvider;

    impl VideoProvider for FailingProvider {
        fn search_ids(&self, _query: &str) -> Result<Vec<String>, VideoSearchError> {
            Err(VideoSearchError::ProviderError {
                status: 403,
                message: "quota exceeded".to_string(),
            })
        }

        fn video_details(&self, _ids: &[String]) -> Result<Vec<VideoDetail>, VideoSearchError> {
            unreachable!("details are never requested after a failed search")
        }
    }

    #[test]
    fn test_search_sets_start_offset() {
        let search = VideoSearch::new(Box::new(StubProvider::new(&["abc", "def"])));
        let videos = search
            .search_videos_for_query("query", Some("00:15:30"))
            .unwrap();

        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].embed_descriptor.video_id, "abc");
        assert_eq!(videos[0].embed_descriptor.start_seconds, 930);
        assert_eq!(videos[0].embed_url, "https://www.youtube.com/embed/abc?start=930");
    }

    #[test]
    fn test_search_without_timecode_starts_at_zero() {
        let search = VideoSearch::new(Box::new(StubProvider::new(&["abc"])));
        let videos = search.search_videos_for_query("query", None).unwrap();

        assert_eq!(videos[0].embed_descriptor.start_seconds, 0);
        assert_eq!(videos[0].embed_url, "https://www.youtube.com/embed/abc");
    }

    #[test]
    fn test_empty_search_skips_detail_call() {
        let search = VideoSearch::new(Box::new(StubProvider::new(&[])));
        let videos = search.search_videos_for_query("query", None).unwrap();
        assert!(videos.is_empty());
    }

    #[test]
    fn test_search_error_propagates() {
        let search = VideoSearch::new(Box::new(FailingProvider));
        let result = search.search_videos_for_query("query", None);
        assert!(matches!(
            result,
            Err(VideoSearchError::ProviderError { status: 403, .. })
        ));
    }

    #[test]
    fn test_find_clip_uses_title_and_timecode() {
        let media = crate::resolved_media::MediaDraft {
            title: Some("The Terminator".to_string()),
            ..Default::default()
        }
        .finish("00:01:40".to_string());

        let search = VideoSearch::new(Box::new(StubProvider::new(&["t800"])));
        let videos = search.find_clip(&media, "I'll be back").unwrap();
        assert_eq!(videos[0].embed_descriptor.start_seconds, 100);
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let result = VideoSearch::from_config(&Config::default());
        assert!(matches!(
            result,
            Err(crate::QuoteDetectiveError::Config(ConfigError::MissingApiKey(
                "YOUTUBE_API_KEY"
            )))
        ));
    }

    #[test]
    fn test_build_query_ignores_blank_title() {
        assert_eq!(build_video_query(Some("  "), "Hi"), "movie scene \"Hi\"");
    }
}
