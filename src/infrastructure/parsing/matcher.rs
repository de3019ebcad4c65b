//! Compiled field matchers

use scraper::{ElementRef, Selector};
use tracing::{debug, warn};

use super::config::MatcherSpec;
use super::{ParsingError, ParsingResult};

/// A compiled CSS selector plus the attribute to read, if any
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    selector: Selector,
    attribute: Option<String>,
}

impl FieldMatcher {
    /// First non-blank value this matcher yields inside `scope`
    fn first_value(&self, scope: &ElementRef<'_>) -> Option<String> {
        scope.select(&self.selector).find_map(|element| {
            let value = match &self.attribute {
                Some(attribute) => element.value().attr(attribute).map(str::to_string),
                None => Some(element.text().collect::<String>()),
            };
            value.filter(|v| !v.trim().is_empty())
        })
    }
}

/// First non-blank value across `matchers`, tried in priority order
///
/// Only descendants of `scope` are searched, so adjacent result blocks
/// cannot leak into each other.
pub fn first_match(scope: &ElementRef<'_>, matchers: &[FieldMatcher]) -> Option<String> {
    matchers.iter().find_map(|matcher| matcher.first_value(scope))
}

/// Compile a field's matcher list, skipping invalid entries
///
/// An empty list is allowed and simply never matches. A non-empty list in
/// which every selector is invalid is an error.
pub fn compile_matchers(field: &str, specs: &[MatcherSpec]) -> ParsingResult<Vec<FieldMatcher>> {
    let mut matchers = Vec::with_capacity(specs.len());
    let mut errors = Vec::new();

    for spec in specs {
        match Selector::parse(&spec.selector) {
            Ok(selector) => matchers.push(FieldMatcher {
                selector,
                attribute: spec.attribute.clone(),
            }),
            Err(e) => {
                warn!("Failed to compile {} selector '{}': {}", field, spec.selector, e);
                errors.push(format!("'{}': {}", spec.selector, e));
            }
        }
    }

    if matchers.is_empty() && !errors.is_empty() {
        return Err(ParsingError::NoValidSelectors {
            field: field.to_string(),
            errors,
        });
    }

    if !errors.is_empty() {
        debug!("Some {} selectors failed to compile: {}", field, errors.join(", "));
    }

    Ok(matchers)
}
