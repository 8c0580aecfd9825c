use crate::UrlError;
use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "msclkid"];

/// Normalizes a URL so that one page maps to one frontier key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything but http/https
/// 3. Lowercase the host and resolve dot segments (done by the parser)
/// 4. Remove fragment (everything after #)
/// 5. Remove tracking query parameters
/// 6. Sort remaining query parameters alphabetically
/// 7. Remove empty query string (trailing ?)
///
/// Scheme, `www.` prefixes and trailing slashes are left alone: they are part
/// of the origin or of the resource identity on the sites we crawl.
///
/// # Examples
///
/// ```
/// use site_chat::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.gov/a/../page?b=2&a=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.gov/page?a=1&b=2");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed URL
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    if let Some(query) = url.query() {
        let segments = filter_and_sort_query(query);
        if segments.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&segments.join("&")));
        }
    }

    Ok(url)
}

/// Drops tracking parameters and sorts the rest by key
///
/// Segments are kept exactly as written so their percent-encoding survives.
/// The sort is stable: repeated keys keep their relative order.
fn filter_and_sort_query(query: &str) -> Vec<String> {
    let mut segments: Vec<&str> = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| !is_tracking_param(query_key(segment)))
        .collect();

    segments.sort_by(|a, b| query_key(a).cmp(query_key(b)));
    segments.into_iter().map(str::to_string).collect()
}

fn query_key(segment: &str) -> &str {
    segment.split_once('=').map_or(segment, |(key, _)| key)
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
