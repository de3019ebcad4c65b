//! Parsing error types
//!
//! Extraction itself never fails: missing fields degrade to empty strings.
//! These errors cover building the matchers (bad selectors or signature
//! patterns in configuration) and URL resolution, which the normalizer
//! absorbs.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("No valid selectors for '{field}': {}", errors.join(", "))]
    NoValidSelectors { field: String, errors: Vec<String> },

    #[error("Invalid block-page signature: {reason}")]
    InvalidSignature {
        patterns: Vec<String>,
        reason: String,
    },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed {
        url: String,
        reason: String,
        base_url: Option<String>,
    },
}

impl ParsingError {
    /// Create an invalid selector error
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether processing can continue past this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UrlResolutionFailed { .. })
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
