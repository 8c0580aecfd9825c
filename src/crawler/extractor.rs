//! HTML extraction of paragraph text and same-origin links
//!
//! Parsing is done by `scraper` (html5ever), which recovers from malformed
//! markup the way browsers do, so extraction never fails: broken documents
//! simply yield whatever text and links could be salvaged.

use crate::url::{normalize_parsed, Origin};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// One fetched and extracted page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: Url,
    /// Paragraph text joined by single spaces
    pub text: String,
    /// Same-origin links in document order, without duplicates
    pub outbound_links: Vec<Url>,
}

impl Page {
    /// Extracts a page from markup fetched at `url`
    pub fn from_markup(url: Url, markup: &str, origin: &Origin) -> Self {
        let document = Html::parse_document(markup);
        Self {
            url,
            text: extract_paragraph_text(&document),
            outbound_links: extract_links(&document, origin),
        }
    }
}

/// Extracts paragraph text and same-origin links from markup
///
/// # Example
///
/// ```
/// use site_chat::crawler::extract;
/// use site_chat::url::Origin;
/// use url::Url;
///
/// let origin = Origin::of(&Url::parse("https://example.gov/").unwrap()).unwrap();
/// let html = r#"<p>First</p><p>Second <a href="/about">about</a></p>"#;
/// let (text, links) = extract(html, &origin);
/// assert_eq!(text, "First Second about");
/// assert_eq!(links[0].as_str(), "https://example.gov/about");
/// ```
pub fn extract(markup: &str, origin: &Origin) -> (String, Vec<Url>) {
    let document = Html::parse_document(markup);
    (
        extract_paragraph_text(&document),
        extract_links(&document, origin),
    )
}

/// Text of every `<p>` in document order
///
/// Whitespace inside a paragraph is collapsed and empty paragraphs are dropped
/// so that paragraphs are separated by exactly one space.
fn extract_paragraph_text(document: &Html) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_links(document: &Html, origin: &Origin) -> Vec<Url> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(resolved) = origin.resolve(href) else {
            continue;
        };

        let Ok(normalized) = normalize_parsed(resolved) else {
            continue;
        };

        if seen.insert(normalized.as_str().to_string()) {
            links.push(normalized);
        }
    }

    links
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
