//! Infrastructure layer for fetching, parsing, and external integrations
//!
//! This module provides the HTTP transport and fetcher, block-page
//! detection, HTML parsing, configuration loading, and logging.

pub mod block_detector; // Access-denial classification
pub mod config; // Configuration constants and loading
pub mod fetcher; // Retrying search-page fetcher
pub mod http_client;
pub mod logging; // Logging infrastructure
pub mod parsing; // Block locator, field extractor, normalizer
pub mod parsing_error;
pub mod retry_policy;

// Re-export commonly used items
pub use block_detector::{BlockPageDetector, BlockReason};
pub use config::{AppConfig, ConfigManager, marketplace};
pub use fetcher::{FetchError, Fetcher, is_retryable_status};
pub use http_client::{HttpClient, HttpClientConfig, PageTransport, TransportError, TransportResponse};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing::{ParsingError, ParsingResult, RawDocument, SelectorConfig};
pub use retry_policy::RetryPolicy;
