use serde::{Deserialize, Serialize};

/// One extracted search result, ready for display
///
/// `title` and `price` are always non-empty; the normalizer drops any
/// record that fails that bar. The remaining fields are empty strings
/// when the source block did not carry them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub title: String,
    /// Numeric amount as text, without currency symbol
    pub price: String,
    /// Usually "X out of 5 stars"; empty when the listing has no rating
    pub rating: String,
    /// Absolute URL or empty
    pub image_url: String,
    /// Absolute URL to the product detail page, or empty
    pub link: String,
}

/// Run-level outcome of a successful extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// At least one record was produced
    Complete,
    /// Zero records. Valid terminal outcome, not a failure.
    EmptyResult,
}

/// Which container matcher produced the located blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatcherUsed {
    Primary,
    Fallback { priority: usize, selector: String },
    None,
}

/// Aggregate counters exposed for observability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionDiagnostics {
    pub blocks_located: usize,
    pub records_dropped: usize,
    pub matcher: MatcherUsed,
    /// Set when the primary container matcher found nothing. A genuine
    /// empty search and a layout change look the same from here.
    pub possible_structural_drift: bool,
}

/// Ordered record list plus run-level status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub listings: Vec<ProductListing>,
    pub status: ExtractionStatus,
    pub diagnostics: ExtractionDiagnostics,
}

impl ExtractionResult {
    pub fn new(listings: Vec<ProductListing>, diagnostics: ExtractionDiagnostics) -> Self {
        let status = if listings.is_empty() {
            ExtractionStatus::EmptyResult
        } else {
            ExtractionStatus::Complete
        };

        Self {
            listings,
            status,
            diagnostics,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }
}
