//! End-to-end crawls against a mock site

use crate::{html_page, mount_page, mount_small_site};
use site_chat::config::HttpConfig;
use site_chat::crawler::{crawl, CrawlLimits, HttpFetcher, StopReason};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&HttpConfig::default()).expect("Failed to build HTTP client")
}

#[tokio::test]
async fn test_full_crawl_small_site() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;
    let base = server.uri();
    let seed = format!("{}/", base);

    let result = crawl(
        &seed,
        &fetcher(),
        &CrawlLimits::default(),
        &CancellationToken::new(),
    )
    .await
    .expect("Crawl should run");

    assert_eq!(
        result.visited,
        vec![seed.clone(), format!("{}/a", base), format!("{}/b", base)]
    );
    assert_eq!(result.stop, StopReason::Exhausted);
    assert!(result.failures.is_empty());

    let expected = format!(
        "\n\nContent from {}:\nHome page\n\nContent from {}/a:\nPage A\n\nContent from {}/b:\nPage B",
        seed, base, base
    );
    assert_eq!(result.aggregated_text, expected);
}

#[tokio::test]
async fn test_crawl_skips_server_errors() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page("Home", &["/broken", "/ok"])).await;
    mount_page(&server, "/ok", html_page("Still here", &[])).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = crawl(
        &format!("{}/", base),
        &fetcher(),
        &CrawlLimits::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(result.pages_visited(), 3);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].url, format!("{}/broken", base));
    assert!(result.aggregated_text.contains("Still here"));
    assert!(!result
        .aggregated_text
        .contains(&format!("Content from {}/broken", base)));
}

#[tokio::test]
async fn test_crawl_ignores_other_origins() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html_page("Home", &["https://elsewhere.example.com/", "/inside"]),
    )
    .await;
    mount_page(&server, "/inside", html_page("Inside", &[])).await;

    let result = crawl(
        &format!("{}/", base),
        &fetcher(),
        &CrawlLimits::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(result.pages_visited(), 2);
    assert!(result.visited.iter().all(|u| u.starts_with(&base)));
}

#[tokio::test]
async fn test_crawl_page_cap() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let limits = CrawlLimits {
        max_pages: 2,
        max_duration: Duration::from_secs(60),
        request_delay: Duration::ZERO,
    };
    let result = crawl(
        &format!("{}/", server.uri()),
        &fetcher(),
        &limits,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(result.pages_visited(), 2);
    assert_eq!(result.stop, StopReason::PageLimit);
}
