//! Session round trips with a mocked Gemini backend

use crate::mount_small_site;
use site_chat::config::{
    CacheConfig, Config, HttpConfig, ModelConfig, Provider, RefreshConfig, SiteConfig,
    StorageConfig,
};
use site_chat::{Session, SiteChatError, SnapshotStore, SqliteStorage};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_ENV: &str = "SITE_CHAT_INTEGRATION_GEMINI_KEY";

fn config(site: &MockServer, model: &MockServer, dir: &TempDir) -> Config {
    Config {
        site: SiteConfig {
            seed_url: format!("{}/", site.uri()),
            max_pages: 50,
            max_duration_secs: 60,
            request_delay_ms: 0,
        },
        http: HttpConfig::default(),
        model: ModelConfig {
            provider: Provider::Gemini,
            name: "gemini-pro".to_string(),
            api_key_env: KEY_ENV.to_string(),
            endpoint: Some(model.uri()),
            max_chunk_size: 30_000,
            temperature: 0.2,
            timeout_secs: 10,
        },
        cache: CacheConfig { ttl_hours: 720 },
        storage: StorageConfig {
            database_path: dir
                .path()
                .join("site-chat.db")
                .to_string_lossy()
                .into_owned(),
        },
        refresh: RefreshConfig {
            enabled: false,
            interval_hours: 720,
        },
    }
}

async fn mount_gemini(server: &MockServer, answer: &str) {
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .and(header("x-goog-api-key", "integration-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": answer }] }
            }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_ask_end_to_end() {
    std::env::set_var(KEY_ENV, "integration-key");
    let site = MockServer::start().await;
    let model = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_small_site(&site).await;
    mount_gemini(&model, "Pages A and B exist.").await;

    let config = config(&site, &model, &dir);
    let session = Session::from_config(&config, "hash".to_string()).unwrap();

    let reply = session.ask("Which pages exist?").await.unwrap();
    assert_eq!(reply.response, "Pages A and B exist.");
    assert!(reply.warning.is_none());
    assert_eq!(reply.pages_indexed, 3);

    // Memoized: the model mock expects exactly one call
    let again = session.ask("Which pages exist?").await.unwrap();
    assert_eq!(again, reply);

    // The crawl was persisted for the next process
    let store = SqliteStorage::new(&dir.path().join("site-chat.db")).unwrap();
    let snapshot = store
        .load_latest_snapshot(&config.site.seed_url)
        .unwrap()
        .expect("Snapshot should be stored");
    assert_eq!(snapshot.visited_urls.len(), 3);
}

#[tokio::test]
async fn test_backend_error_gives_partial_reply() {
    std::env::set_var(KEY_ENV, "integration-key");
    let site = MockServer::start().await;
    let model = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_small_site(&site).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&model)
        .await;

    let session = Session::from_config(&config(&site, &model, &dir), "hash".to_string()).unwrap();

    let reply = session.ask("Anything?").await.unwrap();
    assert_eq!(reply.response, "");
    assert!(reply.warning.unwrap().contains("0 of 1"));
}

#[tokio::test]
async fn test_missing_credential_is_fatal() {
    let site = MockServer::start().await;
    let model = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let mut config = config(&site, &model, &dir);
    config.model.api_key_env = "SITE_CHAT_INTEGRATION_UNSET_KEY".to_string();

    let result = Session::from_config(&config, "hash".to_string());
    assert!(matches!(result, Err(SiteChatError::Config(_))));
}
