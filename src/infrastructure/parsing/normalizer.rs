//! Record validation and normalization
//!
//! Turns a `RawFields` tuple into a `ProductListing`, or drops it when the
//! minimum bar (non-empty title and price) is not met. Normalization is
//! textual only; prices are never parsed into numbers here.

use tracing::debug;
use url::Url;

use super::field_extractor::RawFields;
use super::{ParsingError, ParsingResult};
use crate::domain::ProductListing;

/// Why a record was filtered out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingTitle,
    MissingPrice,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "missing title"),
            Self::MissingPrice => write!(f, "missing price"),
        }
    }
}

/// Outcome of normalizing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Listing(ProductListing),
    Drop(DropReason),
}

/// Stateless validator/normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer;

impl RecordNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, raw: &RawFields, base: &Url) -> Normalized {
        let title = collapse_whitespace(&raw.title);
        if title.is_empty() {
            return Normalized::Drop(DropReason::MissingTitle);
        }

        let price = collapse_whitespace(&raw.price);
        if price.is_empty() {
            return Normalized::Drop(DropReason::MissingPrice);
        }

        Normalized::Listing(ProductListing {
            title,
            price,
            rating: collapse_whitespace(&raw.rating),
            image_url: resolve_or_empty(&raw.image_url, base),
            link: resolve_or_empty(&raw.link, base),
        })
    }
}

/// Trim and fold internal whitespace runs into single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve a possibly relative reference against `base`
///
/// Empty input stays empty. Absolute URLs are returned as-is.
pub fn resolve_url(raw: &str, base: &Url) -> ParsingResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    if Url::parse(trimmed).is_ok() {
        return Ok(trimmed.to_string());
    }

    base.join(trimmed)
        .map(String::from)
        .map_err(|e| ParsingError::UrlResolutionFailed {
            url: trimmed.to_string(),
            reason: e.to_string(),
            base_url: Some(base.to_string()),
        })
}

fn resolve_or_empty(raw: &str, base: &Url) -> String {
    resolve_url(raw, base).unwrap_or_else(|e| {
        debug!("Dropping unresolvable URL: {}", e);
        String::new()
    })
}
