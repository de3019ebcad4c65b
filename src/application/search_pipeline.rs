//! Pipeline orchestrator
//!
//! One run: fetch the results page, locate result blocks, extract fields
//! from each, normalize, and return listings in document order. Only the
//! fetch suspends; everything after it is synchronous and pure.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::SearchError;
use super::pipeline_stage::StageTracker;
use crate::domain::{ExtractionDiagnostics, ExtractionResult, SearchQuery};
use crate::infrastructure::parsing::{
    BlockLocator, FieldExtractor, Normalized, RawDocument, RecordNormalizer, SearchResultFieldExtractor,
    SearchResultLocator,
};
use crate::infrastructure::{AppConfig, BlockPageDetector, Fetcher, HttpClient, PageTransport};

/// Sequences Fetcher, Block Locator, Field Extractor and Normalizer
///
/// Holds no per-run state, so one pipeline can serve concurrent searches.
pub struct SearchPipeline {
    fetcher: Fetcher,
    locator: Box<dyn BlockLocator>,
    extractor: Box<dyn FieldExtractor>,
    normalizer: RecordNormalizer,
}

impl SearchPipeline {
    /// Pipeline backed by the real HTTP client
    pub fn from_config(config: &AppConfig) -> Result<Self, SearchError> {
        let client = HttpClient::with_config(config.http.clone())?;
        Self::with_transport(config, Arc::new(client))
    }

    /// Pipeline over a caller-supplied transport
    pub fn with_transport(config: &AppConfig, transport: Arc<dyn PageTransport>) -> Result<Self, SearchError> {
        let endpoint = config.marketplace.search_endpoint()?;
        let detector = BlockPageDetector::new(&config.blocking)?;
        let fetcher = Fetcher::new(
            transport,
            endpoint,
            config.marketplace.query_param.clone(),
            config.retry.clone(),
            config.http.timeout(),
            detector,
        );

        Ok(Self {
            fetcher,
            locator: Box::new(SearchResultLocator::new(&config.selectors)?),
            extractor: Box::new(SearchResultFieldExtractor::new(&config.selectors)?),
            normalizer: RecordNormalizer::new(),
        })
    }

    /// Swap in a different block-location strategy
    #[must_use]
    pub fn with_locator(mut self, locator: impl BlockLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Swap in a different field-extraction strategy
    #[must_use]
    pub fn with_extractor(mut self, extractor: impl FieldExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Run one search for a raw keyword
    pub async fn search(&self, keyword: &str) -> Result<ExtractionResult, SearchError> {
        self.search_with_cancellation(keyword, &CancellationToken::new())
            .await
    }

    /// Run one search, aborting the fetch if `cancel` fires first
    pub async fn search_with_cancellation(
        &self,
        keyword: &str,
        cancel: &CancellationToken,
    ) -> Result<ExtractionResult, SearchError> {
        let query = SearchQuery::new(keyword)?;
        self.run(&query, cancel).await
    }

    /// Run one search for an already validated query
    pub async fn run(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<ExtractionResult, SearchError> {
        let mut stages = StageTracker::new(query.keyword());
        info!("🔍 Searching marketplace for '{}'", query);

        stages.advance();
        let document = match self.fetcher.fetch(query, cancel).await {
            Ok(document) => document,
            Err(e) => {
                let error = SearchError::from(e);
                warn!("❌ Search for '{}' failed: {}", query, error);
                stages.fail(&error);
                return Err(error);
            }
        };

        let result = self.extract_tracked(&document, &mut stages);
        info!(
            "✅ Search for '{}' finished: {} listings ({:?})",
            query,
            result.len(),
            result.status
        );
        Ok(result)
    }

    /// Extract listings from an already fetched document
    ///
    /// Deterministic: the same document always yields the same result.
    pub fn extract(&self, document: &RawDocument) -> ExtractionResult {
        let mut stages = StageTracker::new(document.effective_url().as_str());
        stages.advance();
        self.extract_tracked(document, &mut stages)
    }

    fn extract_tracked(&self, document: &RawDocument, stages: &mut StageTracker) -> ExtractionResult {
        stages.advance();
        let html = document.parse();
        let located = self.locator.locate(&html);
        let blocks_located = located.blocks.len();
        let possible_structural_drift = located.possible_structural_drift();

        stages.advance();
        let raw: Vec<_> = located
            .blocks
            .iter()
            .map(|block| (block.position(), self.extractor.extract(block)))
            .collect();

        stages.advance();
        let base = document.effective_url();
        let mut listings = Vec::with_capacity(raw.len());
        let mut records_dropped = 0;

        for (position, fields) in &raw {
            match self.normalizer.normalize(fields, base) {
                Normalized::Listing(listing) => listings.push(listing),
                Normalized::Drop(reason) => {
                    records_dropped += 1;
                    debug!("Dropping block #{}: {}", position, reason);
                }
            }
        }

        stages.advance();
        debug!(
            "Located {} blocks, kept {}, dropped {}",
            blocks_located,
            listings.len(),
            records_dropped
        );

        ExtractionResult::new(
            listings,
            ExtractionDiagnostics {
                blocks_located,
                records_dropped,
                matcher: located.matcher,
                possible_structural_drift,
            },
        )
    }
}
