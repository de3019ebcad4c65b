//! Caller-visible failure taxonomy
//!
//! Every terminal failure of a search run collapses into one `SearchError`.
//! An empty result is not represented here: zero listings is a success.

use thiserror::Error;

use crate::domain::{EmptyKeyword, InvalidAffiliateTag};
use crate::infrastructure::{FetchError, ParsingError, is_retryable_status};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Marketplace unreachable after {attempts} attempt(s): {reason}")]
    Unreachable { attempts: u32, reason: String },

    #[error("Marketplace timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("Blocked by marketplace (status {status}): {reason}")]
    BlockedByRemote { status: u16, reason: String },

    #[error("Unexpected status {status} from marketplace after {attempts} attempt(s)")]
    UnexpectedStatus { status: u16, attempts: u32 },

    #[error("Search cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SearchError {
    /// Stable machine-readable name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "invalid_query",
            Self::Unreachable { .. } => "unreachable",
            Self::Timeout { .. } => "timeout",
            Self::BlockedByRemote { .. } => "blocked_by_remote",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::Cancelled => "cancelled",
            Self::Configuration(_) => "configuration",
        }
    }

    /// "Retry later" failures, as opposed to a bad query, a block, a final
    /// status such as 404, or a local problem
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } => true,
            Self::UnexpectedStatus { status, .. } => is_retryable_status(*status),
            Self::InvalidQuery(_)
            | Self::BlockedByRemote { .. }
            | Self::Cancelled
            | Self::Configuration(_) => false,
        }
    }

    /// Status code an HTTP front end should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidQuery(_) => 400,
            Self::BlockedByRemote { .. } => 503,
            Self::Timeout { .. } => 504,
            Self::Unreachable { .. } | Self::UnexpectedStatus { .. } => 502,
            Self::Cancelled => 499,
            Self::Configuration(_) => 500,
        }
    }
}

impl From<FetchError> for SearchError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Unreachable { attempts, reason } => Self::Unreachable { attempts, reason },
            FetchError::Timeout { attempts } => Self::Timeout { attempts },
            FetchError::BlockedByRemote { status, reason } => Self::BlockedByRemote {
                status,
                reason: reason.to_string(),
            },
            FetchError::UnexpectedStatus { status, attempts } => {
                Self::UnexpectedStatus { status, attempts }
            }
            FetchError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<EmptyKeyword> for SearchError {
    fn from(error: EmptyKeyword) -> Self {
        Self::InvalidQuery(error.to_string())
    }
}

impl From<InvalidAffiliateTag> for SearchError {
    fn from(error: InvalidAffiliateTag) -> Self {
        Self::Configuration(error.to_string())
    }
}

impl From<ParsingError> for SearchError {
    fn from(error: ParsingError) -> Self {
        Self::Configuration(error.to_string())
    }
}

impl From<anyhow::Error> for SearchError {
    fn from(error: anyhow::Error) -> Self {
        Self::Configuration(format!("{error:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ErrorResponse;
    use crate::infrastructure::BlockReason;
    use rstest::rstest;

    #[rstest]
    #[case(SearchError::InvalidQuery("empty".into()), 400, false)]
    #[case(SearchError::Unreachable { attempts: 3, reason: "refused".into() }, 502, true)]
    #[case(SearchError::Timeout { attempts: 3 }, 504, true)]
    #[case(SearchError::BlockedByRemote { status: 403, reason: "denied".into() }, 503, false)]
    #[case(SearchError::UnexpectedStatus { status: 500, attempts: 3 }, 502, true)]
    #[case(SearchError::UnexpectedStatus { status: 404, attempts: 1 }, 502, false)]
    #[case(SearchError::Cancelled, 499, false)]
    #[case(SearchError::Configuration("bad".into()), 500, false)]
    fn maps_to_external_contract(#[case] error: SearchError, #[case] status: u16, #[case] transient: bool) {
        assert_eq!(error.http_status(), status);
        assert_eq!(error.is_transient(), transient);
    }

    #[test]
    fn fetch_block_keeps_reason_text() {
        let error = SearchError::from(FetchError::BlockedByRemote {
            status: 429,
            reason: BlockReason::DeniedStatus(429),
        });
        assert_eq!(
            error,
            SearchError::BlockedByRemote {
                status: 429,
                reason: "access denied with status 429".into()
            }
        );
        assert_eq!(error.kind(), "blocked_by_remote");
    }

    #[test]
    fn final_status_stays_final_across_layers() {
        let fetch = FetchError::UnexpectedStatus {
            status: 404,
            attempts: 1,
        };
        assert!(!fetch.is_transient());

        let error = SearchError::from(fetch);
        assert!(!error.is_transient());
        assert!(!ErrorResponse::from(&error).retryable);

        let gateway = SearchError::from(FetchError::UnexpectedStatus {
            status: 503,
            attempts: 3,
        });
        assert!(ErrorResponse::from(&gateway).retryable);
    }

    #[test]
    fn empty_keyword_is_invalid_query() {
        assert_eq!(
            SearchError::from(EmptyKeyword),
            SearchError::InvalidQuery("search keyword must not be empty".into())
        );
    }
}
