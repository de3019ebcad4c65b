//! Search query value object
//!
//! A `SearchQuery` is constructed once per request and never mutated.
//! Construction is the only place the non-empty keyword rule is enforced,
//! so holding a `SearchQuery` means the keyword has already been checked.

use serde::Serialize;
use std::fmt;

/// Validated, trimmed search keyword
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SearchQuery {
    keyword: String,
}

/// Returned when the caller supplies a keyword that is empty after trimming
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("search keyword must not be empty")]
pub struct EmptyKeyword;

impl SearchQuery {
    /// Build a query from caller input, rejecting blank keywords
    pub fn new(keyword: impl AsRef<str>) -> Result<Self, EmptyKeyword> {
        let trimmed = keyword.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmptyKeyword);
        }

        Ok(Self {
            keyword: trimmed.to_string(),
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keyword)
    }
}
