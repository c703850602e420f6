/// YouTube Data API v3 response types for deserialization.
use serde::Deserialize;

/// Response of the `search` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct YouTubeSearchResponse {
    #[serde(default)]
    pub items: Vec<YouTubeSearchItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct YouTubeSearchItem {
    pub id: YouTubeSearchId,
}

/// Search results only carry a `videoId` for `type=video` queries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct YouTubeSearchId {
    pub video_id: Option<String>,
}

/// Response of the `videos` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct YouTubeVideosResponse {
    #[serde(default)]
    pub items: Vec<YouTubeVideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct YouTubeVideoItem {
    pub id: String,
    pub snippet: YouTubeSnippet,
    pub content_details: Option<YouTubeContentDetails>,
    pub statistics: Option<YouTubeStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct YouTubeSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: YouTubeThumbnails,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct YouTubeThumbnails {
    pub default: Option<YouTubeThumbnail>,
    pub high: Option<YouTubeThumbnail>,
}

#[derive(Debug, Deserialize)]
pub(super) struct YouTubeThumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct YouTubeContentDetails {
    /// ISO 8601 duration
    pub duration: String,
}

/// Counters are transmitted as decimal strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct YouTubeStatistics {
    pub view_count: Option<String>,
}

/// Error envelope returned alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(super) struct YouTubeErrorResponse {
    pub error: YouTubeErrorBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct YouTubeErrorBody {
    pub message: String,
}
