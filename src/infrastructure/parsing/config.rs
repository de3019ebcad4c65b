//! Selector configuration for search-result extraction
//!
//! Centralized CSS matchers, so a markup change on the marketplace is a
//! configuration edit rather than a code change. Each list is tried in
//! order; the first entry of `result_container` is the primary matcher.

use serde::{Deserialize, Serialize};

/// A CSS selector plus where to read the value from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherSpec {
    pub selector: String,

    /// Attribute to read; text content when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl MatcherSpec {
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attribute: None,
        }
    }

    pub fn attr(selector: &str, attribute: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attribute: Some(attribute.to_string()),
        }
    }
}

/// How a split whole/fraction price is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFormat {
    /// Whole-number fragment only ("1,299")
    #[default]
    WholeOnly,
    /// Whole and fractional fragments joined with '.' ("1,299.99")
    WholeAndFraction,
}

/// CSS selectors for search-result pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Result block containers; primary first, then fallbacks
    pub result_container: Vec<String>,

    /// Heading text of the entry
    pub title: Vec<MatcherSpec>,

    /// Whole-number price fragment, or a full formatted price
    pub price_whole: Vec<MatcherSpec>,

    /// Fractional price fragment, consulted for `WholeAndFraction`
    pub price_fraction: Vec<MatcherSpec>,

    /// Star rating label
    pub rating: Vec<MatcherSpec>,

    /// Thumbnail image reference
    pub image: Vec<MatcherSpec>,

    /// Product detail link
    pub link: Vec<MatcherSpec>,

    pub price_format: PriceFormat,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            result_container: vec![
                r#"div.s-result-item[data-component-type="s-search-result"]"#.to_string(),
                r#"[data-component-type="s-search-result"]"#.to_string(),
                r#"div.s-result-item[data-asin]:not([data-asin=""])"#.to_string(),
            ],
            title: vec![
                MatcherSpec::text("h2 span"),
                MatcherSpec::text("h2"),
                MatcherSpec::text(r#"[data-cy="title-recipe"] span"#),
            ],
            price_whole: vec![
                MatcherSpec::text(".a-price-whole"),
                MatcherSpec::text(".a-price .a-offscreen"),
            ],
            price_fraction: vec![MatcherSpec::text(".a-price-fraction")],
            rating: vec![
                MatcherSpec::text(".a-icon-star-small .a-icon-alt"),
                MatcherSpec::text(r#"i[class*="a-star"] .a-icon-alt"#),
                MatcherSpec::attr(r#"[aria-label*="out of 5 stars"]"#, "aria-label"),
            ],
            image: vec![
                MatcherSpec::attr("img.s-image", "src"),
                MatcherSpec::attr("img", "src"),
            ],
            link: vec![
                MatcherSpec::attr("a.a-link-normal", "href"),
                MatcherSpec::attr("h2 a", "href"),
                MatcherSpec::attr(r#"a[href*="/dp/"]"#, "href"),
            ],
            price_format: PriceFormat::WholeOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_container_is_the_search_result_marker() {
        let config = SelectorConfig::default();
        assert!(config.result_container[0].contains(r#"data-component-type="s-search-result""#));
        assert_eq!(config.price_format, PriceFormat::WholeOnly);
    }

    #[test]
    fn price_format_uses_snake_case() {
        let format: PriceFormat = serde_json::from_str(r#""whole_and_fraction""#).unwrap();
        assert_eq!(format, PriceFormat::WholeAndFraction);
    }
}
