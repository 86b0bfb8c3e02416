//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the `brandsight-server`
//! integration tests. `TestApp` spawns a real server on a random port whose
//! search, extraction and generation providers all point at one
//! `httpmock::MockServer`, so each test scripts the remote services it needs.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use brandsight_server::{
    config, router,
    state::{build_app_state, AppState},
};
use axum::serve;
use httpmock::{Method::POST, Mock, MockServer};
use reqwest::Client;
use serde_json::{json, Value};
use std::{fs::File, io::Write, net::SocketAddr};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const EXA_KEY: &str = "test-exa-key";
pub const GEMINI_KEY: &str = "test-gemini-key";
pub const MODEL: &str = "gemini-2.5-flash";

pub const BRIEFING: &str =
    "# Market Intelligence Briefing\n\n## 1. Executive Summary\nAcmeCo is well reviewed.";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with an in-memory insight store.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_db(":memory:", "").await
    }

    /// Spawns the server with the given `db_url` and extra YAML appended to the config.
    pub async fn spawn_with_db(db_url: &str, extra_yaml: &str) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
db_url: "{db_url}"
request_timeout_secs: 5
search:
  api_url: "{base}"
  api_key: "{EXA_KEY}"
  num_results: 5
extraction:
  api_url: "{base}"
  max_characters: 5000
generation:
  provider: "gemini"
  api_url: "{base}"
  api_key: "{GEMINI_KEY}"
  model_name: "{MODEL}"
{extra_yaml}
"#,
            base = mock_server.base_url(),
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let app_state = build_app_state(config).await?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let app = router::create_router(app_state.clone());
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Scripts the Exa `/search` answer for one query.
    pub async fn mock_search(&self, query: &str, urls: &[&str]) -> Mock<'_> {
        let results: Vec<Value> = urls
            .iter()
            .map(|url| json!({"title": format!("Title of {url}"), "url": url}))
            .collect();
        let body = json!({ "query": query });
        self.mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/search")
                    .header("x-api-key", EXA_KEY)
                    .json_body_partial(body.to_string());
                then.status(200).json_body(json!({ "results": results }));
            })
            .await
    }

    /// Scripts a failing Exa `/search` answer for one query.
    pub async fn mock_search_failure(&self, query: &str, status: u16) -> Mock<'_> {
        let body = json!({ "query": query });
        self.mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/search")
                    .json_body_partial(body.to_string());
                then.status(status).body("search backend unavailable");
            })
            .await
    }

    /// Scripts the Exa `/contents` answer: every URL is extracted successfully.
    pub async fn mock_contents(&self, urls: &[&str], context: &str) -> Mock<'_> {
        let results: Vec<Value> = urls
            .iter()
            .map(|url| json!({"id": url, "url": url, "title": format!("Title of {url}"), "text": format!("Text of {url}")}))
            .collect();
        let statuses: Vec<Value> = urls
            .iter()
            .map(|url| json!({"id": url, "status": "success"}))
            .collect();
        let context = context.to_string();
        self.mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/contents")
                    .header("x-api-key", EXA_KEY);
                then.status(200).json_body(json!({
                    "results": results,
                    "context": context,
                    "statuses": statuses,
                }));
            })
            .await
    }

    /// Scripts the Gemini `generateContent` answer.
    pub async fn mock_generation(&self, text: &str) -> Mock<'_> {
        let text = text.to_string();
        self.mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(format!("/models/{MODEL}:generateContent"))
                    .header("x-goog-api-key", GEMINI_KEY);
                then.status(200).json_body(json!({
                    "candidates": [{"content": {"parts": [{"text": text}]}}]
                }));
            })
            .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
