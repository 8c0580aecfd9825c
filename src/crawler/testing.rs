//! In-memory site used by crawler and session tests

use crate::crawler::{Fetch, FetchError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

pub(crate) const BASE: &str = "https://example.gov";

/// Serves canned markup by path; unknown paths are 404
#[derive(Default)]
pub(crate) struct StaticSite {
    pages: HashMap<String, Result<String, u16>>,
    fetched: Mutex<Vec<String>>,
}

impl StaticSite {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a page whose body is `<p>{text}</p>` plus one anchor per link
    pub(crate) fn page(mut self, path: &str, text: &str, links: &[&str]) -> Self {
        let anchors: String = links
            .iter()
            .map(|l| format!(r#"<a href="{}">{}</a>"#, l, l))
            .collect();
        let body = format!(
            "<html><body><p>{}</p><nav>{}</nav></body></html>",
            text, anchors
        );
        self.pages.insert(url(path), Ok(body));
        self
    }

    pub(crate) fn failing(mut self, path: &str, status: u16) -> Self {
        self.pages.insert(url(path), Err(status));
        self
    }

    /// URLs in the order they were requested
    pub(crate) fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for StaticSite {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.get(url.as_str()) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

pub(crate) fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}
