//! Per-block field extraction
//!
//! Each field has its own prioritized matcher list, evaluated only inside
//! the block. A field that cannot be found comes back as an empty string;
//! trimming, dropping and URL resolution are left to the normalizer.

use super::config::{PriceFormat, SelectorConfig};
use super::document::CandidateBlock;
use super::matcher::{FieldMatcher, compile_matchers, first_match};
use super::{FieldExtractor, ParsingResult};

/// Un-normalized field values for one block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub title: String,
    pub price: String,
    pub rating: String,
    pub image_url: String,
    pub link: String,
}

/// Field extractor driven by `SelectorConfig`
#[derive(Debug, Clone)]
pub struct SearchResultFieldExtractor {
    title: Vec<FieldMatcher>,
    price_whole: Vec<FieldMatcher>,
    price_fraction: Vec<FieldMatcher>,
    rating: Vec<FieldMatcher>,
    image: Vec<FieldMatcher>,
    link: Vec<FieldMatcher>,
    price_format: PriceFormat,
}

impl SearchResultFieldExtractor {
    pub fn new(config: &SelectorConfig) -> ParsingResult<Self> {
        Ok(Self {
            title: compile_matchers("title", &config.title)?,
            price_whole: compile_matchers("price_whole", &config.price_whole)?,
            price_fraction: compile_matchers("price_fraction", &config.price_fraction)?,
            rating: compile_matchers("rating", &config.rating)?,
            image: compile_matchers("image", &config.image)?,
            link: compile_matchers("link", &config.link)?,
            price_format: config.price_format,
        })
    }

    fn extract_price(&self, block: &CandidateBlock<'_>) -> String {
        let Some(raw) = first_match(block.element(), &self.price_whole) else {
            return String::new();
        };
        let Some(amount) = PriceAmount::parse(&raw) else {
            return String::new();
        };

        match self.price_format {
            PriceFormat::WholeOnly => amount.whole,
            PriceFormat::WholeAndFraction => {
                let fraction = amount.fraction.or_else(|| {
                    first_match(block.element(), &self.price_fraction)
                        .map(|f| f.chars().filter(char::is_ascii_digit).collect::<String>())
                        .filter(|f| !f.is_empty())
                });
                match fraction {
                    Some(fraction) => format!("{}.{}", amount.whole, fraction),
                    None => amount.whole,
                }
            }
        }
    }
}

impl FieldExtractor for SearchResultFieldExtractor {
    fn extract(&self, block: &CandidateBlock<'_>) -> RawFields {
        let scope = block.element();
        RawFields {
            title: first_match(scope, &self.title).unwrap_or_default(),
            price: self.extract_price(block),
            rating: first_match(scope, &self.rating).unwrap_or_default(),
            image_url: first_match(scope, &self.image).unwrap_or_default(),
            link: first_match(scope, &self.link).unwrap_or_default(),
        }
    }
}

/// Numeric amount pulled out of a price fragment
///
/// Accepts either a bare whole fragment ("1,299.") or a full formatted
/// price ("$1,299.99"). A trailing `.`/`,` followed by one or two digits
/// is read as the fraction; any other separators belong to the whole part.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PriceAmount {
    whole: String,
    fraction: Option<String>,
}

impl PriceAmount {
    fn parse(text: &str) -> Option<Self> {
        let start = text.find(|c: char| c.is_ascii_digit())?;
        let token: String = text[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
            .collect();
        let token = token.trim_end_matches([',', '.']);

        let split = token
            .rfind([',', '.'])
            .filter(|&at| (1..=2).contains(&(token.len() - at - 1)));

        let amount = match split {
            Some(at) => Self {
                whole: token[..at].to_string(),
                fraction: Some(token[at + 1..].to_string()),
            },
            None => Self {
                whole: token.to_string(),
                fraction: None,
            },
        };

        Some(amount)
    }
}
