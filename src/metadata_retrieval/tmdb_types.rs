/// TMDB API response types for deserialization.
///
/// These structures mirror the JSON response format from the TMDB v3 API.
use serde::Deserialize;

/// The response from the multi search endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbSearchResponse {
    /// Search results, movies, series and people mixed
    #[serde(default)]
    pub results: Vec<TmdbSearchItem>,
}

/// A single multi search result.
///
/// Movies carry `title`/`release_date`, series carry `name`/`first_air_date`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbSearchItem {
    pub id: u64,
    /// `movie`, `tv` or `person`
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
}

/// Movie details with appended credits.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbMovieDetails {
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub credits: Option<TmdbCredits>,
}

/// Series details with appended credits.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbTvDetails {
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub created_by: Vec<TmdbCreator>,
    pub credits: Option<TmdbCredits>,
}

/// Cast and crew of a movie or series.
#[derive(Debug, Default, Deserialize)]
pub(super) struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

/// A series creator.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbCreator {
    pub name: String,
}

/// A cast member, listed in billing order.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbCastMember {
    pub name: String,
}

/// A crew member, e.g. the director.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbCrewMember {
    pub name: String,
    pub job: Option<String>,
}
