//! Draft enrichment from catalog data
//!
//! Merging follows a "first writer wins" rule: values already present in the
//! draft, typically from the model's hypothesis, are never replaced. Only the
//! identifying fields `catalog_id` and `media_type` always come from the
//! catalog.

use crate::metadata_retrieval::{CatalogCandidate, CatalogDetail, MediaType};
use crate::resolved_media::MediaDraft;

/// Number of lead cast members kept in the result
pub const MAX_ACTORS: usize = 5;

/// Merges a selected search candidate into the draft
///
/// # Arguments
///
/// * `draft` - The draft to fill
/// * `candidate` - The selected catalog candidate
/// * `poster_base_url` - Image base url the relative poster path is joined to
pub fn merge_candidate(
    draft: &mut MediaDraft,
    candidate: &CatalogCandidate,
    poster_base_url: &str,
) {
    draft.catalog_id = Some(candidate.id);
    draft.media_type = Some(candidate.media_type);

    fill(&mut draft.title, || {
        Some(candidate.title.clone()).filter(|t| !t.is_empty())
    });
    fill(&mut draft.year, || candidate.release_year().map(str::to_string));
    fill(&mut draft.overview, || candidate.overview.clone());
    fill(&mut draft.poster_url, || {
        candidate
            .poster_path
            .as_deref()
            .map(|path| format!("{}{}", poster_base_url.trim_end_matches('/'), path))
    });
    fill(&mut draft.is_series, || {
        Some(candidate.media_type == MediaType::Series)
    });
}

/// Applies supplementary details to the draft
///
/// Directors (or series creators) are joined with `", "`; only the first
/// [`MAX_ACTORS`] cast members are kept. Empty lists leave the fields absent.
pub fn apply_detail(draft: &mut MediaDraft, detail: &CatalogDetail) {
    fill(&mut draft.director, || {
        Some(detail.directors.join(", ")).filter(|d| !d.is_empty())
    });
    fill(&mut draft.actors, || {
        Some(detail.cast.iter().take(MAX_ACTORS).cloned().collect::<Vec<_>>())
            .filter(|actors| !actors.is_empty())
    });
    fill(&mut draft.overview, || detail.overview.clone());
    fill(&mut draft.year, || {
        detail
            .release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .filter(|year| !year.is_empty())
            .map(str::to_string)
    });
}

/// Sets `slot` from `value` only if it is still empty
fn fill<T>(slot: &mut Option<T>, value: impl FnOnce() -> Option<T>) {
    if slot.is_none() {
        *slot = value();
    }
}
