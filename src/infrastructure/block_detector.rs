//! Access-denial detection
//!
//! A blocked request is not a network fault: the remote answered, but
//! with a refusal or a bot-check page instead of results. Status codes
//! alone are not enough because bot-check pages are often served with
//! 200 or 503, so the final URL and body are matched against known
//! fingerprints as well.

use regex::{RegexSet, RegexSetBuilder};
use std::fmt;

use super::config::BlockDetectionConfig;
use super::parsing::ParsingError;

/// Why a response was classified as blocked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    DeniedStatus(u16),
    Signature(String),
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeniedStatus(status) => write!(f, "access denied with status {status}"),
            Self::Signature(pattern) => write!(f, "block page matched '{pattern}'"),
        }
    }
}

pub struct BlockPageDetector {
    denial_statuses: Vec<u16>,
    signatures: RegexSet,
}

impl BlockPageDetector {
    pub fn new(config: &BlockDetectionConfig) -> Result<Self, ParsingError> {
        let signatures = RegexSetBuilder::new(&config.body_signatures)
            .case_insensitive(true)
            .build()
            .map_err(|e| ParsingError::InvalidSignature {
                patterns: config.body_signatures.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            denial_statuses: config.denial_statuses.clone(),
            signatures,
        })
    }

    /// Classify a response; `None` means it is not a block
    pub fn detect(&self, status: u16, final_url: &str, body: &str) -> Option<BlockReason> {
        if self.denial_statuses.contains(&status) {
            return Some(BlockReason::DeniedStatus(status));
        }

        self.signatures
            .matches(final_url)
            .into_iter()
            .chain(self.signatures.matches(body))
            .next()
            .map(|index| BlockReason::Signature(self.signatures.patterns()[index].clone()))
    }
}
