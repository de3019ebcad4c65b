//! Data Transfer Objects for the search boundary
//!
//! Shapes handed to whatever renders results (CLI, HTTP layer). Affiliate
//! tagging happens here, after extraction has finished.

use serde::{Deserialize, Serialize};

use super::error::SearchError;
use crate::domain::{
    AffiliateTag, ExtractionDiagnostics, ExtractionResult, ExtractionStatus, ProductListing,
    SearchQuery,
};

/// Successful search, possibly with zero listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub keyword: String,
    pub status: ExtractionStatus,
    pub count: usize,
    pub listings: Vec<ProductListing>,
    pub diagnostics: ExtractionDiagnostics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliate_tag: Option<String>,
}

impl SearchResponse {
    pub fn new(query: &SearchQuery, result: ExtractionResult, affiliate: Option<&AffiliateTag>) -> Self {
        let ExtractionResult {
            listings,
            status,
            diagnostics,
        } = result;

        let listings = match affiliate {
            Some(tag) => tag.apply_all(listings),
            None => listings,
        };

        Self {
            keyword: query.keyword().to_string(),
            status,
            count: listings.len(),
            listings,
            diagnostics,
            affiliate_tag: affiliate.map(|tag| tag.as_str().to_string()),
        }
    }
}

/// Failed search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    pub retryable: bool,
    pub status: u16,
}

impl From<&SearchError> for ErrorResponse {
    fn from(error: &SearchError) -> Self {
        Self {
            error: error.to_string(),
            kind: error.kind().to_string(),
            retryable: error.is_transient(),
            status: error.http_status(),
        }
    }
}
