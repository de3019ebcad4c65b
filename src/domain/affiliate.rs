//! Affiliate tag rewrite for outbound product links
//!
//! Applied after the pipeline returns, at the presentation boundary. The
//! tag is an explicit value handed in by the caller, so several tags can
//! coexist in one process (and in tests).

use serde::Serialize;
use tracing::debug;
use url::Url;

use super::product::ProductListing;

const TAG_PARAM: &str = "tag";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("affiliate tag must not be empty")]
pub struct InvalidAffiliateTag;

/// Tracking tag written into the `tag` query parameter of product links
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffiliateTag(String);

impl AffiliateTag {
    pub fn new(tag: impl Into<String>) -> Result<Self, InvalidAffiliateTag> {
        let tag = tag.into().trim().to_string();
        if tag.is_empty() {
            return Err(InvalidAffiliateTag);
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Set or overwrite the `tag` query parameter on `link`
    ///
    /// The first existing `tag` is replaced in place and any duplicates
    /// are removed. Empty or unparseable links come back unchanged.
    pub fn apply(&self, link: &str) -> String {
        if link.trim().is_empty() {
            return link.to_string();
        }

        let mut url = match Url::parse(link) {
            Ok(url) => url,
            Err(e) => {
                debug!("Leaving unparseable link untouched ({}): {}", e, link);
                return link.to_string();
            }
        };

        let mut replaced = false;
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter_map(|(key, value)| {
                if key == TAG_PARAM {
                    if replaced {
                        return None;
                    }
                    replaced = true;
                    return Some((key.into_owned(), self.0.clone()));
                }
                Some((key.into_owned(), value.into_owned()))
            })
            .collect();

        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            if !replaced {
                query.append_pair(TAG_PARAM, &self.0);
            }
        }

        url.to_string()
    }

    /// Rewrite the link of every listing, preserving order
    pub fn apply_all(&self, listings: Vec<ProductListing>) -> Vec<ProductListing> {
        listings
            .into_iter()
            .map(|listing| ProductListing {
                link: self.apply(&listing.link),
                ..listing
            })
            .collect()
    }
}
