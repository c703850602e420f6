//! Hypothesis parsing
//!
//! Language models rarely answer with clean JSON. Replies arrive wrapped in
//! prose, markdown fences, or without any JSON at all. This module turns such
//! replies into a [`QuoteHypothesis`] and never fails: the worst case is an
//! empty hypothesis.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

static FULL_TIMECODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,2}:\d{2}:\d{2}").expect("full timecode pattern is valid")
});

static SHORT_TIMECODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}").expect("short timecode pattern is valid"));

/// A season or episode designation as reported by the model
///
/// Models answer with either `3` or `"3"` (and occasionally `"3a"`), so both
/// shapes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EpisodeRef {
    /// A numeric season or episode
    Number(u64),
    /// A textual season or episode
    Text(String),
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeRef::Number(n) => write!(f, "{}", n),
            EpisodeRef::Text(s) => f.write_str(s),
        }
    }
}

/// The model's best guess about where a quote comes from
///
/// Every field is optional. An empty hypothesis is valid and simply means
/// the later stages have nothing to work with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteHypothesis {
    /// Title of the movie or series
    pub title: Option<String>,
    /// Release year
    pub year: Option<String>,
    /// Whether the model believes the quote is from a tv series
    pub is_series: Option<bool>,
    /// Season number for series
    pub season: Option<EpisodeRef>,
    /// Episode number for series
    pub episode: Option<EpisodeRef>,
    /// Timecode of the quote within the video
    pub timecode: Option<String>,
}

impl QuoteHypothesis {
    /// Returns true if no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Builds a hypothesis from a decoded JSON object
    ///
    /// Unknown keys are ignored and values of the wrong type are dropped.
    fn from_object(object: &Map<String, Value>) -> Self {
        let field = |snake: &str, camel: &str| object.get(snake).or_else(|| object.get(camel));

        Self {
            title: object.get("title").and_then(string_value),
            year: object.get("year").and_then(year_value),
            is_series: field("is_series", "isSeries").and_then(Value::as_bool),
            season: object.get("season").and_then(episode_value),
            episode: object.get("episode").and_then(episode_value),
            timecode: object.get("timecode").and_then(string_value),
        }
    }
}

/// Parses a raw model reply into a [`QuoteHypothesis`]
///
/// The greedy region between the first `{` and the last `}` is decoded as
/// JSON. If that fails, the reply is searched for an `H:MM:SS` timecode, then
/// for an `M:SS` timecode (returned with an `00:` prefix). Anything else
/// yields an empty hypothesis.
///
/// # Examples
///
/// ```
/// use quote_detective::hypothesis::parse_response;
///
/// let reply = "Sure! ```json\n{\"title\": \"Alien\", \"year\": \"1979\"}\n```";
/// let hypothesis = parse_response(reply);
/// assert_eq!(hypothesis.title.as_deref(), Some("Alien"));
/// assert_eq!(hypothesis.year.as_deref(), Some("1979"));
/// ```
pub fn parse_response(raw: &str) -> QuoteHypothesis {
    if let Some(object) = extract_json_object(raw) {
        return QuoteHypothesis::from_object(&object);
    }

    debug!("No usable JSON object in model reply, falling back to timecode scan");

    if let Some(found) = FULL_TIMECODE.find(raw) {
        return QuoteHypothesis {
            timecode: Some(found.as_str().to_string()),
            ..Default::default()
        };
    }

    if let Some(found) = SHORT_TIMECODE.find(raw) {
        return QuoteHypothesis {
            timecode: Some(format!("00:{}", found.as_str())),
            ..Default::default()
        };
    }

    QuoteHypothesis::default()
}

/// Decodes the greedy brace-delimited region, if it is a JSON object
fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(object)) => Some(object),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "Model reply contained malformed JSON");
            None
        }
    }
}

/// Accepts non-blank strings only
fn string_value(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accepts non-blank strings and integral numbers
fn year_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_u64().map(|year| year.to_string()),
        other => string_value(other),
    }
}

/// Accepts non-blank strings and non-negative integers
fn episode_value(value: &Value) -> Option<EpisodeRef> {
    match value {
        Value::Number(n) => n.as_u64().map(EpisodeRef::Number),
        other => string_value(other).map(EpisodeRef::Text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let hypothesis = parse_response(
            r#"{"title": "The Terminator", "year": "1984", "is_series": false, "timecode": "00:15:30"}"#,
        );

        assert_eq!(hypothesis.title.as_deref(), Some("The Terminator"));
        assert_eq!(hypothesis.year.as_deref(), Some("1984"));
        assert_eq!(hypothesis.is_series, Some(false));
        assert_eq!(hypothesis.timecode.as_deref(), Some("00:15:30"));
    }

    #[test]
    fn test_parse_ignores_prose_and_fences() {
        let reply = "Great question! Here you go:\n```json\n{\n  \"title\": \"Breaking Bad\",\n  \"is_series\": true,\n  \"season\": 5,\n  \"episode\": \"14\"\n}\n```\nLet me know if you need more.";
        let hypothesis = parse_response(reply);

        assert_eq!(hypothesis.title.as_deref(), Some("Breaking Bad"));
        assert_eq!(hypothesis.is_series, Some(true));
        assert_eq!(hypothesis.season, Some(EpisodeRef::Number(5)));
        assert_eq!(hypothesis.episode, Some(EpisodeRef::Text("14".to_string())));
    }

    #[test]
    fn test_parse_drops_wrong_types_and_unknown_keys() {
        let hypothesis = parse_response(
            r#"{"title": 42, "year": 1999, "is_series": "yes", "director": "Someone", "timecode": null}"#,
        );

        assert_eq!(hypothesis.title, None);
        assert_eq!(hypothesis.year.as_deref(), Some("1999"));
        assert_eq!(hypothesis.is_series, None);
        assert_eq!(hypothesis.timecode, None);
    }

    #[test]
    fn test_parse_accepts_camel_case_series_flag() {
        let hypothesis = parse_response(r#"{"isSeries": true}"#);
        assert_eq!(hypothesis.is_series, Some(true));
    }

    #[test]
    fn test_parse_blank_strings_are_absent() {
        let hypothesis = parse_response(r#"{"title": "   ", "season": ""}"#);
        assert!(hypothesis.is_empty());
    }

    #[test]
    fn test_parse_full_timecode_fallback() {
        let hypothesis = parse_response("I think it's around 1:12:05 into the film.");
        assert_eq!(hypothesis.timecode.as_deref(), Some("1:12:05"));
        assert_eq!(hypothesis.title, None);
    }

    #[test]
    fn test_parse_short_timecode_fallback() {
        let hypothesis = parse_response("Roughly at 5:30.");
        assert_eq!(hypothesis.timecode.as_deref(), Some("00:5:30"));
    }

    #[test]
    fn test_parse_malformed_json_falls_back_to_timecode() {
        let hypothesis = parse_response("{title: Alien, timecode: 00:42:10");
        // No closing brace, so no JSON region at all
        assert_eq!(hypothesis.timecode.as_deref(), Some("00:42:10"));

        let hypothesis = parse_response("{title: Alien} at 00:42:10");
        assert_eq!(hypothesis.timecode.as_deref(), Some("00:42:10"));
    }

    #[test]
    fn test_parse_garbage_is_empty() {
        assert!(parse_response("").is_empty());
        assert!(parse_response("I have no idea, sorry.").is_empty());
        assert!(parse_response("} backwards {").is_empty());
        assert!(parse_response("[1, 2, 3] {\"not\": \"closed\"").is_empty());
    }

    #[test]
    fn test_parse_non_object_json_is_ignored() {
        assert!(parse_response(r#"{"a": 1} and {"b": 2}"#).is_empty());
    }
}
