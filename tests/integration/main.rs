//! Integration tests for site-chat
//!
//! These tests use wiremock to stand in for the website and the model
//! backend, and exercise the public API end-to-end.

mod crawl_tests;
mod session_tests;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an HTML page with one paragraph and one anchor per link
pub fn html_page(text: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<li><a href="{}">{}</a></li>"#, l, l))
        .collect();
    format!(
        "<html><head><title>Test</title></head><body><p>{}</p><ul>{}</ul></body></html>",
        text, anchors
    )
}

/// Serves `body` as HTML at `route`
pub async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

/// The three-page site: seed -> /a, /b; /a -> seed
pub async fn mount_small_site(server: &MockServer) {
    mount_page(server, "/", html_page("Home page", &["/a", "/b"])).await;
    mount_page(server, "/a", html_page("Page A", &["/"])).await;
    mount_page(server, "/b", html_page("Page B", &[])).await;
}
