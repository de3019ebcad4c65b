//! Fetched markup and handles into its parsed tree

use scraper::{ElementRef, Html};
use url::Url;

/// Fetched markup plus the URL it was served from
///
/// Never mutated after the Fetcher hands it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    body: String,
    effective_url: Url,
}

impl RawDocument {
    pub fn new(body: impl Into<String>, effective_url: Url) -> Self {
        Self {
            body: body.into(),
            effective_url,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Base for resolving relative links and images
    pub fn effective_url(&self) -> &Url {
        &self.effective_url
    }

    /// Parse into a traversable tree
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// One putative result entry, borrowed from a parsed document
#[derive(Debug, Clone, Copy)]
pub struct CandidateBlock<'a> {
    element: ElementRef<'a>,
    position: usize,
}

impl<'a> CandidateBlock<'a> {
    pub fn new(element: ElementRef<'a>, position: usize) -> Self {
        Self { element, position }
    }

    /// Read-only root of the block; field lookups stay beneath it
    pub fn element(&self) -> &ElementRef<'a> {
        &self.element
    }

    /// Zero-based index in document order
    pub fn position(&self) -> usize {
        self.position
    }
}
