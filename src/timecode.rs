//! Timecode handling
//!
//! Timecodes reach us in many shapes: `H:MM:SS` from the language model,
//! `MM:SS` from sloppier replies, plain seconds from the player. This module
//! folds all of them into integer seconds and formats them back into the
//! canonical `HH:MM:SS` form used by [`crate::ResolvedMedia`].

/// Timecode used when neither the model nor the lookup table knows better
pub const DEFAULT_TIMECODE: &str = "00:10:00";

/// Well-known quotes mapped to canned timecodes
///
/// Matching is a case-insensitive "contains" check in table order, so the
/// first entry found inside the quote wins.
const KNOWN_QUOTES: &[(&str, &str)] = &[
    ("I'll be back", "00:15:30"),
    ("May the Force be with you", "00:23:45"),
    ("Say hello to my little friend", "00:45:12"),
    ("Houston, we have a problem", "01:12:05"),
    ("Life is like a box of chocolates", "01:34:28"),
];

/// Positional weights for seconds, minutes and hours
const WEIGHTS: [u64; 3] = [1, 60, 3600];

/// A time value as it arrives from callers: either text or raw seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeValue<'a> {
    /// A colon separated timecode such as `01:02:03`, `02:03` or `5`
    Text(&'a str),
    /// A number of seconds
    Seconds(u64),
}

impl<'a> From<&'a str> for TimeValue<'a> {
    fn from(value: &'a str) -> Self {
        TimeValue::Text(value)
    }
}

impl<'a> From<&'a String> for TimeValue<'a> {
    fn from(value: &'a String) -> Self {
        TimeValue::Text(value.as_str())
    }
}

impl From<u64> for TimeValue<'_> {
    fn from(value: u64) -> Self {
        TimeValue::Seconds(value)
    }
}

impl From<u32> for TimeValue<'_> {
    fn from(value: u32) -> Self {
        TimeValue::Seconds(u64::from(value))
    }
}

/// Converts a time value into a number of seconds
///
/// Numeric input passes through unchanged. Text is split on `:` and read
/// right to left as seconds, minutes and hours. Only the three least
/// significant segments are honored; anything beyond is ignored. Empty or
/// unparseable text yields 0.
///
/// # Examples
///
/// ```
/// use quote_detective::timecode::coerce;
///
/// assert_eq!(coerce("01:02:03"), 3723);
/// assert_eq!(coerce("02:03"), 123);
/// assert_eq!(coerce(42u64), 42);
/// assert_eq!(coerce(""), 0);
/// ```
pub fn coerce<'a>(value: impl Into<TimeValue<'a>>) -> u64 {
    match value.into() {
        TimeValue::Seconds(seconds) => seconds,
        TimeValue::Text(text) => parse_segments(text).unwrap_or(0),
    }
}

/// Formats a number of seconds as `HH:MM:SS`
///
/// Hours are not wrapped, so very long durations simply grow the hour field.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Normalizes a textual timecode into canonical `HH:MM:SS`
///
/// Returns `None` when the text is empty or any honored segment is not a
/// number, letting callers treat garbage as "no timecode" instead of zero.
pub fn normalize(text: &str) -> Option<String> {
    parse_segments(text).map(format_hms)
}

/// Looks up a canned timecode for well-known quotes
pub fn lookup_known_quote(quote: &str) -> Option<&'static str> {
    let quote = quote.to_lowercase();
    KNOWN_QUOTES
        .iter()
        .find(|(needle, _)| quote.contains(&needle.to_lowercase()))
        .map(|(_, timecode)| *timecode)
}

/// Parses the colon separated segments, `None` on empty or malformed input
fn parse_segments(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    text.split(':')
        .rev()
        .take(WEIGHTS.len())
        .zip(WEIGHTS)
        .try_fold(0u64, |total, (segment, weight)| {
            let value: u64 = segment.trim().parse().ok()?;
            total.checked_add(value.checked_mul(weight)?)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_segment_counts() {
        assert_eq!(coerce("01:02:03"), 3723);
        assert_eq!(coerce("02:03"), 123);
        assert_eq!(coerce("5"), 5);
        assert_eq!(coerce(""), 0);
    }

    #[test]
    fn test_coerce_numeric_passthrough() {
        assert_eq!(coerce(930u64), 930);
        assert_eq!(coerce(7u32), 7);
    }

    #[test]
    fn test_coerce_ignores_extra_segments() {
        // Only the three least significant segments count
        assert_eq!(coerce("9:01:02:03"), 3723);
    }

    #[test]
    fn test_coerce_unparseable_is_zero() {
        assert_eq!(coerce("abc"), 0);
        assert_eq!(coerce("01:xx:03"), 0);
        assert_eq!(coerce("  "), 0);
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(3723), "01:02:03");
        assert_eq!(format_hms(930), "00:15:30");
        assert_eq!(format_hms(360_000), "100:00:00");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("00:5:30").as_deref(), Some("00:05:30"));
        assert_eq!(normalize("1:2:3").as_deref(), Some("01:02:03"));
        assert_eq!(normalize("90").as_deref(), Some("00:01:30"));
        assert_eq!(normalize("soon"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn test_lookup_known_quote() {
        assert_eq!(lookup_known_quote("I'll be back"), Some("00:15:30"));
        assert_eq!(
            lookup_known_quote("he said MAY THE FORCE BE WITH YOU, kid"),
            Some("00:23:45")
        );
        assert_eq!(lookup_known_quote("xyzzy plugh"), None);
    }
}
