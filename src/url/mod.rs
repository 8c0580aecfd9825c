//! URL handling module for site-chat
//!
//! This module provides the crawl origin (scheme + host + port), same-origin
//! link resolution, and URL normalization used to key the frontier.

mod normalize;
mod origin;

pub use normalize::{normalize_parsed, normalize_url};
pub use origin::Origin;

use crate::UrlError;
use url::Url;

/// Parses and normalizes a seed URL, returning it with its origin
///
/// # Examples
///
/// ```
/// use site_chat::url::seed_and_origin;
///
/// let (seed, origin) = seed_and_origin("https://example.gov/start#intro").unwrap();
/// assert_eq!(seed.as_str(), "https://example.gov/start");
/// assert_eq!(origin.host(), "example.gov");
/// ```
pub fn seed_and_origin(seed: &str) -> Result<(Url, Origin), UrlError> {
    let seed = normalize_url(seed)?;
    let origin = Origin::of(&seed)?;
    Ok((seed, origin))
}
