//! Domain module - search queries, product listings and extraction results
//!
//! Plain value types shared by every layer. Nothing here performs I/O.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod affiliate;
pub mod product;
pub mod search_query;

pub use affiliate::{AffiliateTag, InvalidAffiliateTag};
pub use product::{
    ExtractionDiagnostics, ExtractionResult, ExtractionStatus, MatcherUsed, ProductListing,
};
pub use search_query::{EmptyKeyword, SearchQuery};
