//! Search-result block locator
//!
//! Tries the configured container matchers in priority order and keeps the
//! first one that finds anything. An empty primary match is reported as
//! possible structural drift but is never an error: a genuine empty search
//! produces the same picture.

use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::config::SelectorConfig;
use super::document::CandidateBlock;
use super::{BlockLocator, LocatedBlocks, ParsingError, ParsingResult};
use crate::domain::MatcherUsed;

#[derive(Debug, Clone)]
struct ContainerMatcher {
    priority: usize,
    source: String,
    selector: Selector,
}

/// Locates repeated result entries using prioritized CSS matchers
#[derive(Debug, Clone)]
pub struct SearchResultLocator {
    matchers: Vec<ContainerMatcher>,
}

impl SearchResultLocator {
    /// Compile the container matchers
    ///
    /// The primary matcher must compile; broken fallbacks are skipped with
    /// a warning.
    pub fn new(config: &SelectorConfig) -> ParsingResult<Self> {
        let mut matchers = Vec::with_capacity(config.result_container.len());

        for (priority, source) in config.result_container.iter().enumerate() {
            match Selector::parse(source) {
                Ok(selector) => matchers.push(ContainerMatcher {
                    priority,
                    source: source.clone(),
                    selector,
                }),
                Err(e) if priority == 0 => {
                    return Err(ParsingError::invalid_selector(source, e));
                }
                Err(e) => warn!("Skipping fallback container selector '{}': {}", source, e),
            }
        }

        if matchers.is_empty() {
            return Err(ParsingError::NoValidSelectors {
                field: "result_container".to_string(),
                errors: Vec::new(),
            });
        }

        Ok(Self { matchers })
    }
}

impl BlockLocator for SearchResultLocator {
    fn locate<'a>(&self, document: &'a Html) -> LocatedBlocks<'a> {
        for matcher in &self.matchers {
            let blocks: Vec<CandidateBlock<'a>> = document
                .select(&matcher.selector)
                .enumerate()
                .map(|(position, element)| CandidateBlock::new(element, position))
                .collect();

            if blocks.is_empty() {
                debug!("Container matcher #{} '{}' found nothing", matcher.priority, matcher.source);
                continue;
            }

            debug!(
                "Found {} result blocks using container matcher #{} '{}'",
                blocks.len(),
                matcher.priority,
                matcher.source
            );

            let used = if matcher.priority == 0 {
                MatcherUsed::Primary
            } else {
                warn!(
                    "Primary container matcher found nothing; fallback #{} '{}' matched {} blocks (possible structural drift)",
                    matcher.priority,
                    matcher.source,
                    blocks.len()
                );
                MatcherUsed::Fallback {
                    priority: matcher.priority,
                    selector: matcher.source.clone(),
                }
            };

            return LocatedBlocks {
                blocks,
                matcher: used,
            };
        }

        warn!("No container matcher found result blocks: empty search or possible structural drift");
        LocatedBlocks {
            blocks: Vec::new(),
            matcher: MatcherUsed::None,
        }
    }
}
