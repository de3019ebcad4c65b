//! Search-result parsing infrastructure
//!
//! Trait-based stages over a parsed document: a `BlockLocator` finds the
//! repeated result entries, a `FieldExtractor` pulls raw values out of one
//! entry, and the `RecordNormalizer` turns raw values into listings.

pub mod block_locator;
pub mod config;
pub mod document;
pub mod error;
pub mod field_extractor;
pub mod matcher;
pub mod normalizer;

// Re-export public types
pub use block_locator::SearchResultLocator;
pub use config::{MatcherSpec, PriceFormat, SelectorConfig};
pub use document::{CandidateBlock, RawDocument};
pub use error::{ParsingError, ParsingResult};
pub use field_extractor::{RawFields, SearchResultFieldExtractor};
pub use normalizer::{DropReason, Normalized, RecordNormalizer};

use scraper::Html;

use crate::domain::MatcherUsed;

/// Blocks found in a document plus the matcher that found them
#[derive(Debug, Clone)]
pub struct LocatedBlocks<'a> {
    /// Candidate blocks in document order
    pub blocks: Vec<CandidateBlock<'a>>,
    pub matcher: MatcherUsed,
}

impl LocatedBlocks<'_> {
    /// True when the primary matcher found nothing
    pub fn possible_structural_drift(&self) -> bool {
        self.matcher != MatcherUsed::Primary
    }
}

/// Locates repeated result entries in a parsed document
///
/// Never fails: "nothing found" is an empty `blocks` list.
pub trait BlockLocator: Send + Sync {
    fn locate<'a>(&self, document: &'a Html) -> LocatedBlocks<'a>;
}

/// Extracts raw field values from a single candidate block
///
/// Lookups must stay inside the block. Missing fields come back empty.
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, block: &CandidateBlock<'_>) -> RawFields;
}
