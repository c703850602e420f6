/// YouTube video provider implementation.
use super::youtube_types::{
    YouTubeErrorResponse, YouTubeSearchResponse, YouTubeVideoItem, YouTubeVideosResponse,
};
use super::{VideoDetail, VideoProvider, VideoSearchError};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Number of search results requested per query
const MAX_RESULTS: &str = "5";

/// Video provider for the YouTube Data API v3.
pub struct YouTubeProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl YouTubeProvider {
    /// Creates a new YouTube provider instance.
    ///
    /// # Arguments
    ///
    /// * `api_key` - The YouTube Data API key
    /// * `base_url` - API root, e.g. `https://www.googleapis.com/youtube/v3`
    /// * `timeout` - Upper bound for every request
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VideoSearchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VideoSearchError::RequestError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Converts a YouTube video item to our internal VideoDetail structure.
    fn convert_item(item: YouTubeVideoItem) -> VideoDetail {
        let thumbnails = item.snippet.thumbnails;

        VideoDetail {
            id: item.id,
            title: item.snippet.title,
            description: item.snippet.description,
            thumbnail_url: thumbnails.high.or(thumbnails.default).map(|t| t.url),
            channel_title: item.snippet.channel_title,
            duration: item
                .content_details
                .map(|details| details.duration)
                .unwrap_or_default(),
            view_count: item
                .statistics
                .and_then(|stats| stats.view_count)
                .and_then(|count| count.parse().ok()),
            published_at: item.snippet.published_at,
        }
    }

    /// Performs a GET request against the API and decodes the JSON body.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, VideoSearchError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .map_err(|e| VideoSearchError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<YouTubeErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(VideoSearchError::ProviderError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .map_err(|e| VideoSearchError::ParseError(e.to_string()))
    }
}

impl VideoProvider for YouTubeProvider {
    fn search_ids(&self, query: &str) -> Result<Vec<String>, VideoSearchError> {
        let response: YouTubeSearchResponse = self.get_json(
            "/search",
            &[
                ("part", "snippet"),
                ("maxResults", MAX_RESULTS),
                ("q", query),
                ("type", "video"),
            ],
        )?;

        let ids: Vec<String> = response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();

        debug!(query, count = ids.len(), "YouTube search finished");
        Ok(ids)
    }

    fn video_details(&self, ids: &[String]) -> Result<Vec<VideoDetail>, VideoSearchError> {
        let joined = ids.join(",");
        let response: YouTubeVideosResponse = self.get_json(
            "/videos",
            &[
                ("part", "contentDetails,snippet,statistics"),
                ("id", joined.as_str()),
            ],
        )?;

        Ok(response.items.into_iter().map(Self::convert_item).collect())
    }
}
