//! Provider clients against mock HTTP servers
//!
//! The clients are blocking, so they are created, used and dropped on the
//! blocking pool.

use quote_detective::metadata_retrieval::{
    CatalogProvider, MediaType, MetadataRetrievalError, TmdbProvider,
};
use quote_detective::text_generation::{
    GeminiApiGenerator, MistralApiGenerator, TextGenerationError, TextGenerator,
};
use quote_detective::video_search::{VideoSearch, VideoSearchError, YouTubeProvider};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test(flavor = "multi_thread")]
async fn test_tmdb_search_keeps_movies_and_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .and(query_param("api_key", "tmdb-key"))
        .and(query_param("query", "Heat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": 949, "media_type": "movie", "title": "Heat", "release_date": "1995-12-15", "poster_path": "/heat.jpg", "overview": "Obsessive master thief." },
                { "id": 1, "media_type": "person", "name": "Heat Miser" },
                { "id": 77, "media_type": "tv", "name": "Heat", "first_air_date": "", "overview": "" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let candidates = tokio::task::spawn_blocking(move || {
        let provider = TmdbProvider::new("tmdb-key", base_url, TIMEOUT).unwrap();
        provider.search("Heat")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].id, 949);
    assert_eq!(candidates[0].media_type, MediaType::Movie);
    assert_eq!(candidates[0].release_year(), Some("1995"));
    assert_eq!(candidates[1].media_type, MediaType::Series);
    assert_eq!(candidates[1].release_date, None);
    assert_eq!(candidates[1].overview, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tmdb_movie_details_with_credits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/949"))
        .and(query_param("append_to_response", "credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "overview": "Obsessive master thief.",
            "release_date": "1995-12-15",
            "credits": {
                "cast": [ { "name": "Al Pacino" }, { "name": "Robert De Niro" } ],
                "crew": [
                    { "name": "Michael Mann", "job": "Director" },
                    { "name": "Dante Spinotti", "job": "Director of Photography" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let detail = tokio::task::spawn_blocking(move || {
        let provider = TmdbProvider::new("tmdb-key", base_url, TIMEOUT).unwrap();
        provider.details(949, MediaType::Movie)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(detail.directors, vec!["Michael Mann"]);
    assert_eq!(detail.cast, vec!["Al Pacino", "Robert De Niro"]);
    assert_eq!(detail.release_date.as_deref(), Some("1995-12-15"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tmdb_series_details_use_creators() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tv/1396"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "overview": "A chemistry teacher turns to crime.",
            "first_air_date": "2008-01-20",
            "created_by": [ { "name": "Vince Gilligan" } ],
            "credits": { "cast": [ { "name": "Bryan Cranston" } ] }
        })))
        .mount(&server)
        .await;

    let base_url = server.uri();
    let detail = tokio::task::spawn_blocking(move || {
        let provider = TmdbProvider::new("tmdb-key", base_url, TIMEOUT).unwrap();
        provider.details(1396, MediaType::Series)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(detail.directors, vec!["Vince Gilligan"]);
    assert_eq!(detail.cast, vec!["Bryan Cranston"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tmdb_missing_entry_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let base_url = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let provider = TmdbProvider::new("tmdb-key", base_url, TIMEOUT).unwrap();
        provider.details(1, MediaType::Movie)
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(MetadataRetrievalError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gemini_generate_joins_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(query_param("key", "gemini-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "Where is this from?" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [ { "text": "{\"title\": " }, { "text": "\"Heat\"}" } ] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let reply = tokio::task::spawn_blocking(move || {
        let generator =
            GeminiApiGenerator::new("gemini-key", base_url, "gemini-test", TIMEOUT).unwrap();
        generator.generate("Where is this from?")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(reply, "{\"title\": \"Heat\"}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gemini_http_error_is_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .mount(&server)
        .await;

    let base_url = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let generator =
            GeminiApiGenerator::new("gemini-key", base_url, "gemini-test", TIMEOUT).unwrap();
        generator.generate("prompt")
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(TextGenerationError::ServiceError(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_mistral_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer mistral-key"))
        .and(body_partial_json(json!({ "model": "mistral-test" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  {\"title\": \"Alien\"}  " } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let reply = tokio::task::spawn_blocking(move || {
        let generator =
            MistralApiGenerator::new("mistral-key", base_url, "mistral-test", TIMEOUT).unwrap();
        generator.generate("prompt")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(reply, "{\"title\": \"Alien\"}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_youtube_search_then_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("part", "snippet"))
        .and(query_param("maxResults", "5"))
        .and(query_param("type", "video"))
        .and(query_param("key", "yt-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": { "kind": "youtube#video", "videoId": "abc" } },
                { "id": { "kind": "youtube#video", "videoId": "def" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("part", "contentDetails,snippet,statistics"))
        .and(query_param("id", "abc,def"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "abc",
                    "snippet": {
                        "title": "Terminator - I'll be back",
                        "description": "Police station scene",
                        "thumbnails": { "high": { "url": "https://i.ytimg.com/vi/abc/hqdefault.jpg" } },
                        "channelTitle": "Movieclips",
                        "publishedAt": "2011-06-01T12:00:00Z"
                    },
                    "contentDetails": { "duration": "PT2M31S" },
                    "statistics": { "viewCount": "1000" }
                },
                {
                    "id": "def",
                    "snippet": { "title": "Fan edit", "thumbnails": {} }
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let videos = tokio::task::spawn_blocking(move || {
        let provider = YouTubeProvider::new("yt-key", base_url, TIMEOUT).unwrap();
        let query = "The Terminator movie scene \"I'll be back\"";
        VideoSearch::new(Box::new(provider)).search_videos_for_query(query, Some("00:15:30"))
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].embed_url, "https://www.youtube.com/embed/abc?start=930");
    assert_eq!(videos[0].view_count, Some(1000));
    assert_eq!(videos[1].thumbnail_url, None);
    assert_eq!(videos[1].embed_descriptor.start_seconds, 930);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_youtube_empty_search_skips_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let videos = tokio::task::spawn_blocking(move || {
        let provider = YouTubeProvider::new("yt-key", base_url, TIMEOUT).unwrap();
        VideoSearch::new(Box::new(provider)).search_videos_for_query("nothing", None)
    })
    .await
    .unwrap()
    .unwrap();

    assert!(videos.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_youtube_error_envelope_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "The request cannot be completed because you have exceeded your quota." }
        })))
        .mount(&server)
        .await;

    let base_url = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let provider = YouTubeProvider::new("yt-key", base_url, TIMEOUT).unwrap();
        VideoSearch::new(Box::new(provider)).search_videos_for_query("anything", None)
    })
    .await
    .unwrap();

    match result {
        Err(VideoSearchError::ProviderError { status, message }) => {
            assert_eq!(status, 403);
            assert!(message.contains("quota"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
