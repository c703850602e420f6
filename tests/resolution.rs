//! End-to-end quote resolution against mocked Gemini and TMDB endpoints

use quote_detective::metadata_retrieval::MediaType;
use quote_detective::{Config, GeneratorKind, QuotePipeline, ResolvedMedia};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config {
        generator: GeneratorKind::Gemini,
        gemini_api_key: Some("gemini-key".to_string()),
        gemini_base_url: server.uri(),
        gemini_model: "gemini-test".to_string(),
        tmdb_api_key: Some("tmdb-key".to_string()),
        tmdb_base_url: server.uri(),
        tmdb_image_base_url: "https://img.example/w500".to_string(),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

async fn resolve(config: Config, quote: &'static str) -> ResolvedMedia {
    tokio::task::spawn_blocking(move || {
        let pipeline = QuotePipeline::from_config(&config).unwrap();
        pipeline.resolve_quote(quote)
    })
    .await
    .unwrap()
}

fn gemini_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [ { "text": text } ] } }]
    }))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_quote_resolves_to_enriched_movie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(gemini_reply(
            "Sure! ```json\n{\"title\": \"The Terminator\", \"year\": 1984, \"is_series\": false, \"timecode\": \"01:10:03\"}\n```",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .and(query_param("query", "The Terminator"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": 87101, "media_type": "movie", "title": "Terminator Genisys", "release_date": "2015-06-23" },
                { "id": 218, "media_type": "movie", "title": "The Terminator", "release_date": "1984-10-26", "poster_path": "/q.jpg", "overview": "A cyborg is sent back in time." }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/218"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "overview": "Detail overview",
            "release_date": "1984-10-26",
            "credits": {
                "cast": [
                    { "name": "Arnold Schwarzenegger" }, { "name": "Michael Biehn" },
                    { "name": "Linda Hamilton" }, { "name": "Paul Winfield" },
                    { "name": "Lance Henriksen" }, { "name": "Rick Rossovich" }
                ],
                "crew": [ { "name": "James Cameron", "job": "Director" } ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let media = resolve(config_for(&server), "I'll be back").await;

    assert_eq!(media.title.as_deref(), Some("The Terminator"));
    assert_eq!(media.year.as_deref(), Some("1984"));
    assert_eq!(media.catalog_id, Some(218));
    assert_eq!(media.media_type, Some(MediaType::Movie));
    assert_eq!(media.poster_url.as_deref(), Some("https://img.example/w500/q.jpg"));
    assert_eq!(media.overview.as_deref(), Some("A cyborg is sent back in time."));
    assert_eq!(media.director.as_deref(), Some("James Cameron"));
    assert_eq!(media.actors.as_ref().map(Vec::len), Some(5));
    assert_eq!(media.timecode, "01:10:03");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generator_outage_falls_back_to_known_timecode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let media = resolve(config_for(&server), "Houston, we have a problem").await;

    assert_eq!(media.title, None);
    assert_eq!(media.catalog_id, None);
    assert_eq!(media.timecode, "01:12:05");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_catalog_outage_keeps_hypothesis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply("{\"title\": \"Forrest Gump\", \"year\": \"1994\"}"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let media = resolve(config_for(&server), "Life is like a box of chocolates").await;

    assert_eq!(media.title.as_deref(), Some("Forrest Gump"));
    assert_eq!(media.year.as_deref(), Some("1994"));
    assert_eq!(media.poster_url, None);
    assert_eq!(media.timecode, "01:34:28");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_free_text_reply_yields_timecode_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply("I am not sure, maybe around 12:34 into it."))
        .mount(&server)
        .await;

    let media = resolve(config_for(&server), "xyzzy plugh").await;

    assert_eq!(media.title, None);
    assert_eq!(media.timecode, "00:12:34");
}

fn short_timeout_config(server: &MockServer) -> Config {
    Config {
        request_timeout: Duration::from_secs(1),
        ..config_for(server)
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_generator_times_out_to_known_timecode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            gemini_reply("{\"title\": \"The Terminator\"}").set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let started = std::time::Instant::now();
    let media = resolve(short_timeout_config(&server), "I'll be back").await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(media.title, None);
    assert_eq!(media.timecode, "00:15:30");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_catalog_times_out_keeping_hypothesis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply("{\"title\": \"Zork\"}"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "results": [ { "id": 1, "media_type": "movie", "title": "Zork" } ]
                }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let media = resolve(short_timeout_config(&server), "xyzzy plugh").await;

    assert_eq!(media.title.as_deref(), Some("Zork"));
    assert_eq!(media.catalog_id, None);
    assert_eq!(media.timecode, "00:10:00");
}
