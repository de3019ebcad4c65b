//! Marketplace Search - search-results extraction pipeline
//!
//! Fetches a marketplace search page for a keyword and turns the result
//! blocks into an ordered list of product listings.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{ErrorResponse, SearchError, SearchPipeline, SearchResponse};
pub use domain::{AffiliateTag, ExtractionResult, ExtractionStatus, ProductListing, SearchQuery};
