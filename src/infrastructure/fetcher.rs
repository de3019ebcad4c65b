//! Search-page fetcher
//!
//! Builds the search URL, performs the GET through a `PageTransport`, and
//! owns the only retry loop in the pipeline. Transient failures
//! (`Unreachable`, `Timeout`, 5xx gateway statuses) are retried with
//! backoff; access denial is returned after the first attempt.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::block_detector::{BlockPageDetector, BlockReason};
use super::http_client::{PageTransport, TransportError, TransportResponse};
use super::parsing::RawDocument;
use super::retry_policy::RetryPolicy;
use crate::domain::SearchQuery;

/// Statuses worth another attempt when no block signature matched
const RETRYABLE_STATUSES: &[u16] = &[500, 502, 503, 504];

/// Whether an unblocked response with this status is worth another attempt
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Terminal fetch failure, after any retries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("marketplace unreachable after {attempts} attempt(s): {reason}")]
    Unreachable { attempts: u32, reason: String },

    #[error("marketplace timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("blocked by marketplace: {reason}")]
    BlockedByRemote { status: u16, reason: BlockReason },

    #[error("unexpected status {status} after {attempts} attempt(s)")]
    UnexpectedStatus { status: u16, attempts: u32 },

    #[error("fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether the retry loop may try again after this failure
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } => true,
            Self::UnexpectedStatus { status, .. } => is_retryable_status(*status),
            Self::BlockedByRemote { .. } | Self::Cancelled => false,
        }
    }
}

/// Fetches one search-results page per call
pub struct Fetcher {
    transport: Arc<dyn PageTransport>,
    endpoint: Url,
    query_param: String,
    retry: RetryPolicy,
    attempt_timeout: Duration,
    detector: BlockPageDetector,
}

impl Fetcher {
    pub fn new(
        transport: Arc<dyn PageTransport>,
        endpoint: Url,
        query_param: impl Into<String>,
        retry: RetryPolicy,
        attempt_timeout: Duration,
        detector: BlockPageDetector,
    ) -> Self {
        Self {
            transport,
            endpoint,
            query_param: query_param.into(),
            retry,
            attempt_timeout,
            detector,
        }
    }

    /// Search endpoint with the keyword escaped into the query parameter
    pub fn search_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(&self.query_param, query.keyword());
        url
    }

    /// Fetch the results page for `query`
    ///
    /// Cancellation is honoured both while an attempt is in flight and
    /// while waiting out a backoff delay.
    pub async fn fetch(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<RawDocument, FetchError> {
        let url = self.search_url(query);
        let max_attempts = self.retry.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }

            info!("🌐 HTTP GET (attempt {}/{}): {}", attempt, max_attempts, url);

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!("🛑 Fetch cancelled during attempt {}", attempt);
                    return Err(FetchError::Cancelled);
                }
                result = tokio::time::timeout(self.attempt_timeout, self.transport.get(&url)) => result,
            };

            let failure = match outcome {
                Err(_) | Ok(Err(TransportError::Timeout)) => FetchError::Timeout { attempts: attempt },
                Ok(Err(TransportError::Connect(reason) | TransportError::Other(reason))) => {
                    FetchError::Unreachable {
                        attempts: attempt,
                        reason,
                    }
                }
                Ok(Ok(response)) => match self.classify(response, attempt) {
                    Ok(document) => return Ok(document),
                    Err(e) if e.is_transient() => e,
                    Err(e) => {
                        warn!("❌ Not retrying {}: {}", url, e);
                        return Err(e);
                    }
                },
            };

            if !self.retry.should_retry(attempt) {
                warn!("❌ Giving up on {} after {} attempt(s): {}", url, attempt, failure);
                return Err(failure);
            }

            let delay = self.retry.delay_after(attempt);
            warn!(
                "⚠️ Attempt {}/{} failed: {}; retrying in {:?}",
                attempt, max_attempts, failure, delay
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!("🛑 Fetch cancelled during backoff");
                    return Err(FetchError::Cancelled);
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    fn classify(&self, response: TransportResponse, attempt: u32) -> Result<RawDocument, FetchError> {
        let TransportResponse {
            status,
            final_url,
            body,
        } = response;

        if let Some(reason) = self.detector.detect(status, final_url.as_str(), &body) {
            warn!("🚫 Access denied by marketplace ({}): {}", status, reason);
            return Err(FetchError::BlockedByRemote { status, reason });
        }

        match status {
            200..=299 => {
                debug!("Fetched {} bytes from {}", body.len(), final_url);
                Ok(RawDocument::new(body, final_url))
            }
            408 => Err(FetchError::Timeout { attempts: attempt }),
            _ => Err(FetchError::UnexpectedStatus {
                status,
                attempts: attempt,
            }),
        }
    }
}
