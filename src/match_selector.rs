//! Catalog match selection
//!
//! Picks the catalog candidate that best fits the model's hypothesis using
//! simple, deterministic field heuristics: media type first, then release
//! year, then exact title.

use crate::hypothesis::QuoteHypothesis;
use crate::metadata_retrieval::{CatalogCandidate, MediaType};

/// How strictly candidates are disambiguated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Type filter followed by exact title match
    TypeAndTitle,
    /// Like [`SelectionPolicy::TypeAndTitle`], but a candidate released in the
    /// hypothesized year wins before titles are compared
    #[default]
    YearAware,
}

/// Selects the best matching candidate for a hypothesis
///
/// 1. Series are preferred when the hypothesis says so; otherwise movies,
///    then series. If the preferred subset is empty, all candidates are kept.
/// 2. With [`SelectionPolicy::YearAware`] the first candidate whose release
///    date starts with the hypothesized year is returned.
/// 3. The first case-insensitive exact title match is returned, falling back
///    to the first remaining candidate.
///
/// Returns `None` only when there are no candidates at all.
pub fn select_best_match<'a>(
    candidates: &'a [CatalogCandidate],
    hypothesis: &QuoteHypothesis,
    policy: SelectionPolicy,
) -> Option<&'a CatalogCandidate> {
    let filtered = filter_by_type(candidates, hypothesis.is_series == Some(true));

    if policy == SelectionPolicy::YearAware {
        if let Some(year) = hypothesis.year.as_deref() {
            let by_year = filtered.iter().copied().find(|candidate| {
                candidate
                    .release_date
                    .as_deref()
                    .is_some_and(|date| date.starts_with(year))
            });
            if by_year.is_some() {
                return by_year;
            }
        }
    }

    if filtered.len() > 1 {
        if let Some(title) = hypothesis.title.as_deref() {
            let title = title.to_lowercase();
            let exact = filtered
                .iter()
                .copied()
                .find(|candidate| candidate.title.to_lowercase() == title);
            if exact.is_some() {
                return exact;
            }
        }
    }

    filtered.first().copied()
}

/// Narrows candidates to the preferred media type, keeping order
fn filter_by_type(candidates: &[CatalogCandidate], is_series: bool) -> Vec<&CatalogCandidate> {
    let preferred = if is_series {
        of_type(candidates, MediaType::Series)
    } else {
        let movies = of_type(candidates, MediaType::Movie);
        if movies.is_empty() {
            of_type(candidates, MediaType::Series)
        } else {
            movies
        }
    };

    if preferred.is_empty() {
        candidates.iter().collect()
    } else {
        preferred
    }
}

fn of_type(candidates: &[CatalogCandidate], media_type: MediaType) -> Vec<&CatalogCandidate> {
    candidates
        .iter()
        .filter(|candidate| candidate.media_type == media_type)
        .collect()
}
