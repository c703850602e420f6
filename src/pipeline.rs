//! Quote resolution pipeline
//!
//! Runs the stages strictly in order:
//!
//! ```text
//! HYPOTHESIZE -> SEARCH -> SELECT -> MERGE + ENRICH -> ENSURE_TIMECODE
//! ```
//!
//! Every stage but the last is optional. A stage that fails or has nothing to
//! work with is logged and skipped, so a request always ends with a
//! [`ResolvedMedia`], in the worst case carrying only a default timecode.

use crate::config::{Config, GeneratorKind};
use crate::enrichment::{apply_detail, merge_candidate};
use crate::hypothesis::{QuoteHypothesis, parse_response};
use crate::match_selector::{SelectionPolicy, select_best_match};
use crate::metadata_retrieval::{CatalogProvider, TmdbProvider};
use crate::resolved_media::{MediaDraft, ResolvedMedia};
use crate::text_generation::{
    CliGenerator, GeminiApiGenerator, MistralApiGenerator, PromptGenerator, QuotePromptGenerator,
    TextGenerator,
};
use crate::timecode::{self, DEFAULT_TIMECODE};
use crate::QuoteDetectiveError;
use tracing::{debug, info, warn};

/// Progress event emitted while a quote is being resolved
///
/// These events allow library users to follow the pipeline and provide
/// feedback while slow provider calls are in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Asking the language model for a hypothesis
    Hypothesizing,

    /// The model's reply was parsed
    HypothesisReady { hypothesis: QuoteHypothesis },

    /// Searching the catalog for the hypothesized title
    SearchingCatalog { title: String },

    /// Catalog search finished
    CandidatesFound { count: usize },

    /// A candidate was selected
    MatchSelected { catalog_id: u64, title: String },

    /// Fetching cast and crew for the selected candidate
    FetchingDetails { catalog_id: u64 },

    /// Where the final timecode came from
    TimecodeSettled {
        timecode: String,
        source: TimecodeSource,
    },
}

/// Origin of the final timecode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimecodeSource {
    /// Reported by the language model
    Hypothesis,
    /// Found in the table of well-known quotes
    KnownQuote,
    /// Nothing better was known
    Default,
}

/// Resolves quotes into enriched media records
///
/// The pipeline holds no per-request state, so one instance can serve any
/// number of requests, including concurrently through an `Arc`.
pub struct QuotePipeline {
    generator: Option<Box<dyn TextGenerator>>,
    catalog: Option<Box<dyn CatalogProvider>>,
    prompts: Box<dyn PromptGenerator>,
    policy: SelectionPolicy,
    poster_base_url: String,
}

impl Default for QuotePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl QuotePipeline {
    /// Creates a pipeline without any providers
    ///
    /// Such a pipeline only ever produces timecodes from the lookup table or
    /// the default. Providers are attached with [`QuotePipeline::with_generator`]
    /// and [`QuotePipeline::with_catalog`].
    pub fn new() -> Self {
        Self {
            generator: None,
            catalog: None,
            prompts: Box::new(QuotePromptGenerator),
            policy: SelectionPolicy::default(),
            poster_base_url: Config::default().tmdb_image_base_url,
        }
    }

    /// Builds a pipeline from the runtime configuration
    ///
    /// Providers whose api key is missing are left out; the pipeline then
    /// runs degraded instead of failing.
    pub fn from_config(config: &Config) -> Result<Self, QuoteDetectiveError> {
        config.validate()?;
        let timeout = config.request_timeout;

        let generator: Option<Box<dyn TextGenerator>> = match config.generator {
            GeneratorKind::Gemini => match &config.gemini_api_key {
                Some(key) => Some(Box::new(GeminiApiGenerator::new(
                    key.as_str(),
                    config.gemini_base_url.as_str(),
                    config.gemini_model.as_str(),
                    timeout,
                )?)),
                None => None,
            },
            GeneratorKind::Mistral => match &config.mistral_api_key {
                Some(key) => Some(Box::new(MistralApiGenerator::new(
                    key.as_str(),
                    config.mistral_base_url.as_str(),
                    config.mistral_model.as_str(),
                    timeout,
                )?)),
                None => None,
            },
            GeneratorKind::GeminiCli => Some(Box::new(CliGenerator::gemini(timeout))),
            GeneratorKind::ClaudeCli => Some(Box::new(CliGenerator::claude(timeout))),
        };
        if generator.is_none() {
            warn!(
                generator = %config.generator,
                "No api key for text generator, hypotheses disabled"
            );
        }

        let catalog: Option<Box<dyn CatalogProvider>> = match &config.tmdb_api_key {
            Some(key) => Some(Box::new(TmdbProvider::new(
                key.as_str(),
                config.tmdb_base_url.as_str(),
                timeout,
            )?)),
            None => {
                warn!("No TMDB api key, catalog enrichment disabled");
                None
            }
        };

        let mut pipeline = Self::new()
            .with_selection_policy(config.selection_policy)
            .with_poster_base_url(config.tmdb_image_base_url.as_str());
        pipeline.generator = generator;
        pipeline.catalog = catalog;
        Ok(pipeline)
    }

    /// Attaches a text generator for the hypothesis stage
    pub fn with_generator(mut self, generator: Box<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Attaches a catalog for the search and enrichment stages
    pub fn with_catalog(mut self, catalog: Box<dyn CatalogProvider>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Replaces the prompt generator
    pub fn with_prompt_generator(mut self, prompts: Box<dyn PromptGenerator>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Sets how catalog candidates are disambiguated
    pub fn with_selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the base url poster paths are joined to
    pub fn with_poster_base_url(mut self, url: impl Into<String>) -> Self {
        self.poster_base_url = url.into();
        self
    }

    /// Resolves a quote into an enriched media record
    ///
    /// Never fails: provider errors degrade the result instead.
    pub fn resolve_quote(&self, quote: &str) -> ResolvedMedia {
        self.resolve_quote_with_progress(quote, |_| {})
    }

    /// Resolves a quote, reporting progress through a callback
    ///
    /// # Examples
    ///
    /// ```
    /// use quote_detective::{ProgressEvent, QuotePipeline};
    ///
    /// // Without providers only the timecode fallbacks apply
    /// let pipeline = QuotePipeline::new();
    /// let media = pipeline.resolve_quote_with_progress("I'll be back", |event| {
    ///     if let ProgressEvent::TimecodeSettled { timecode, .. } = event {
    ///         println!("timecode: {}", timecode);
    ///     }
    /// });
    /// assert_eq!(media.timecode, "00:15:30");
    /// ```
    pub fn resolve_quote_with_progress<F>(
        &self,
        quote: &str,
        mut progress_callback: F,
    ) -> ResolvedMedia
    where
        F: FnMut(ProgressEvent),
    {
        // HYPOTHESIZE
        progress_callback(ProgressEvent::Hypothesizing);
        let hypothesis = self.hypothesize(quote);
        progress_callback(ProgressEvent::HypothesisReady {
            hypothesis: hypothesis.clone(),
        });

        let mut draft = MediaDraft::from(hypothesis.clone());

        // SEARCH, SELECT, MERGE + ENRICH
        if let (Some(catalog), Some(title)) = (&self.catalog, hypothesis.title.as_deref()) {
            self.enrich(catalog.as_ref(), title, &hypothesis, &mut draft, &mut progress_callback);
        } else {
            debug!("Skipping catalog stages, no title or no catalog");
        }

        // ENSURE_TIMECODE
        let (timecode, source) = ensure_timecode(draft.timecode.as_deref(), quote);
        progress_callback(ProgressEvent::TimecodeSettled {
            timecode: timecode.clone(),
            source,
        });

        let media = draft.finish(timecode);
        info!(title = ?media.title, timecode = %media.timecode, "Quote resolved");
        media
    }

    /// Asks the model for a hypothesis, degrading to an empty one on failure
    fn hypothesize(&self, quote: &str) -> QuoteHypothesis {
        let Some(generator) = &self.generator else {
            debug!("No text generator configured");
            return QuoteHypothesis::default();
        };

        let prompt = self.prompts.generate_quote_prompt(quote);
        match generator.generate(&prompt) {
            Ok(reply) => {
                debug!(reply = %reply, "Model reply received");
                parse_response(&reply)
            }
            Err(e) => {
                warn!(error = %e, "Text generation failed, continuing without hypothesis");
                QuoteHypothesis::default()
            }
        }
    }

    /// Searches, selects and enriches; failures leave the draft as it is
    fn enrich<F>(
        &self,
        catalog: &dyn CatalogProvider,
        title: &str,
        hypothesis: &QuoteHypothesis,
        draft: &mut MediaDraft,
        progress_callback: &mut F,
    ) where
        F: FnMut(ProgressEvent),
    {
        progress_callback(ProgressEvent::SearchingCatalog {
            title: title.to_string(),
        });
        let candidates = catalog.search(title).unwrap_or_else(|e| {
            warn!(title, error = %e, "Catalog search failed");
            Vec::new()
        });
        progress_callback(ProgressEvent::CandidatesFound {
            count: candidates.len(),
        });

        let Some(best) = select_best_match(&candidates, hypothesis, self.policy) else {
            debug!(title, "No catalog match");
            return;
        };
        progress_callback(ProgressEvent::MatchSelected {
            catalog_id: best.id,
            title: best.title.clone(),
        });

        merge_candidate(draft, best, &self.poster_base_url);

        progress_callback(ProgressEvent::FetchingDetails { catalog_id: best.id });
        match catalog.details(best.id, best.media_type) {
            Ok(detail) => apply_detail(draft, &detail),
            Err(e) => warn!(
                catalog_id = best.id,
                media_type = %best.media_type,
                error = %e,
                "Fetching catalog details failed"
            ),
        }
    }
}

/// Settles the final timecode
///
/// A hypothesis timecode is normalized to `HH:MM:SS`; unparseable values are
/// ignored. Then the table of well-known quotes is consulted, and finally the
/// default applies.
fn ensure_timecode(hypothesis_timecode: Option<&str>, quote: &str) -> (String, TimecodeSource) {
    if let Some(normalized) = hypothesis_timecode.and_then(timecode::normalize) {
        return (normalized, TimecodeSource::Hypothesis);
    }

    if let Some(known) = timecode::lookup_known_quote(quote) {
        return (known.to_string(), TimecodeSource::KnownQuote);
    }

    (DEFAULT_TIMECODE.to_string(), TimecodeSource::Default)
}
