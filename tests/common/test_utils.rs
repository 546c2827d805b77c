use alex::{
    config::{Config, LogsConfig, ModelConfig, ServerConfig},
    model::ModelBackend,
    server::{AppState, build_router},
};
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header::SET_COOKIE},
};
use std::{future::Future, sync::Arc, time::Duration};
use tempfile::TempDir;

pub const TEST_API_KEY: &str = "test-api-key";

/// UI assets shipped with the crate
pub fn ui_dir() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/ui").to_string()
}

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    Config {
        api_key: TEST_API_KEY.to_string(),
        model_name: "text_classifier".to_string(),
        data_file_name: "reviews.csv".to_string(),
        target: "sentiment".to_string(),
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5001,
            ui_dir: ui_dir(),
            logs: LogsConfig {
                level: "debug".to_string(),
            },
        },
        model: ModelConfig {
            base_url: "http://127.0.0.1:8000".to_string(),
            api_key: None,
            timeout_secs: 5,
        },
    }
}

pub fn create_test_app_with_config(config: Config, backend: Arc<dyn ModelBackend>) -> Router {
    build_router(AppState {
        config: Arc::new(config),
        backend,
    })
}

pub fn create_test_app(backend: Arc<dyn ModelBackend>) -> Router {
    create_test_app_with_config(create_test_config(), backend)
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Value of the `api_key` cookie set on the response, if any
pub fn api_key_cookie<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == "api_key")
        .map(|(_, value)| value.to_string())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Write a config YAML file into a fresh temporary directory
pub async fn create_test_config_file(content: &str) -> (TempDir, String) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.yaml");
    tokio::fs::write(&config_path, content).await.unwrap();
    let path = config_path.to_string_lossy().to_string();
    (temp_dir, path)
}

/// Poll until the server answers 200 or 204, giving up after ten attempts
pub async fn with_retries<F, Fut>(mut call: F) -> reqwest::Response
where
    F: FnMut() -> Fut,
    Fut: Future<Output = reqwest::Result<reqwest::Response>>,
{
    let mut last = None;
    for _ in 0..10 {
        match call().await {
            Ok(response) if matches!(response.status().as_u16(), 200 | 204) => return response,
            Ok(response) => last = Some(response),
            Err(_) => {}
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    match last {
        Some(response) => panic!(
            "server never became ready: {} {}",
            response.status(),
            response.text().await.unwrap_or_default()
        ),
        None => panic!("server never became reachable"),
    }
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
api_key: "test-api-key"
model_name: "text_classifier"
data_file_name: "reviews.csv"
target: "sentiment"

server:
  host: "127.0.0.1"
  port: 5001
  ui_dir: "ui"
  logs:
    level: "debug"

model:
  base_url: "http://models.local:8000"
  api_key: "backend-key"
  timeout_secs: 10
"#;

/// Bundle that omits the `target` key
pub const MISSING_TARGET_YAML: &str = r#"
api_key: "test-api-key"
model_name: "text_classifier"
data_file_name: "reviews.csv"
"#;
