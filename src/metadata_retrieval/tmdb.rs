/// TMDB catalog provider implementation.
use super::tmdb_types::{
    TmdbCredits, TmdbMovieDetails, TmdbSearchItem, TmdbSearchResponse, TmdbTvDetails,
};
use super::{CatalogCandidate, CatalogDetail, CatalogProvider, MediaType, MetadataRetrievalError};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Catalog provider for The Movie Database (TMDB) API.
///
/// This provider searches https://api.themoviedb.org/3 using the multi search
/// endpoint and fetches details with appended credits.
pub struct TmdbProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl TmdbProvider {
    /// Creates a new TMDB provider instance.
    ///
    /// # Arguments
    ///
    /// * `api_key` - The TMDB v3 api key
    /// * `base_url` - API root, e.g. `https://api.themoviedb.org/3`
    /// * `timeout` - Upper bound for every request
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MetadataRetrievalError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MetadataRetrievalError::RequestError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Converts a multi search item to a candidate, skipping people and unknown types.
    fn convert_item(item: TmdbSearchItem) -> Option<CatalogCandidate> {
        let media_type = match item.media_type.as_deref() {
            Some("movie") => MediaType::Movie,
            Some("tv") => MediaType::Series,
            _ => return None,
        };

        let (title, release_date) = match media_type {
            MediaType::Movie => (item.title.or(item.name), item.release_date),
            MediaType::Series => (item.name.or(item.title), item.first_air_date),
        };

        Some(CatalogCandidate {
            id: item.id,
            media_type,
            title: title.unwrap_or_default(),
            overview: item.overview.filter(|s| !s.is_empty()),
            poster_path: item.poster_path.filter(|s| !s.is_empty()),
            release_date: release_date.filter(|s| !s.is_empty()),
        })
    }

    /// Extracts cast names from appended credits.
    fn cast_names(credits: Option<&TmdbCredits>) -> Vec<String> {
        credits
            .map(|c| c.cast.iter().map(|member| member.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Performs a GET request against the API and decodes the JSON body.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MetadataRetrievalError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .map_err(|e| MetadataRetrievalError::RequestError(e.to_string()))?;

        if response.status() == 404 {
            return Err(MetadataRetrievalError::NotFound(path.to_string()));
        }

        if !response.status().is_success() {
            return Err(MetadataRetrievalError::RequestError(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json()
            .map_err(|e| MetadataRetrievalError::ParseError(e.to_string()))
    }
}

impl CatalogProvider for TmdbProvider {
    fn search(&self, title: &str) -> Result<Vec<CatalogCandidate>, MetadataRetrievalError> {
        let response: TmdbSearchResponse = self.get_json("/search/multi", &[("query", title)])?;

        let candidates: Vec<CatalogCandidate> = response
            .results
            .into_iter()
            .filter_map(Self::convert_item)
            .collect();

        debug!(title, count = candidates.len(), "TMDB multi search finished");
        Ok(candidates)
    }

    fn details(
        &self,
        id: u64,
        media_type: MediaType,
    ) -> Result<CatalogDetail, MetadataRetrievalError> {
        let credits = [("append_to_response", "credits")];

        match media_type {
            MediaType::Movie => {
                let movie: TmdbMovieDetails = self.get_json(&format!("/movie/{}", id), &credits)?;

                let directors = movie
                    .credits
                    .as_ref()
                    .map(|c| {
                        c.crew
                            .iter()
                            .filter(|member| member.job.as_deref() == Some("Director"))
                            .map(|member| member.name.clone())
                            .collect()
                    })
                    .unwrap_or_default();

                Ok(CatalogDetail {
                    overview: movie.overview.filter(|s| !s.is_empty()),
                    release_date: movie.release_date.filter(|s| !s.is_empty()),
                    directors,
                    cast: Self::cast_names(movie.credits.as_ref()),
                })
            }
            MediaType::Series => {
                let tv: TmdbTvDetails = self.get_json(&format!("/tv/{}", id), &credits)?;

                Ok(CatalogDetail {
                    overview: tv.overview.filter(|s| !s.is_empty()),
                    release_date: tv.first_air_date.filter(|s| !s.is_empty()),
                    directors: tv.created_by.into_iter().map(|c| c.name).collect(),
                    cast: Self::cast_names(tv.credits.as_ref()),
                })
            }
        }
    }
}
