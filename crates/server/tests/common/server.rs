//! Server test utilities.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use docket_core::config::{AppConfig, StorageConfig};
use docket_server::{AppState, create_router};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Boundary used for hand-built multipart bodies.
pub const BOUNDARY: &str = "docket-test-boundary";

/// A test server over a temporary filesystem store.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let storage_path = temp_dir.path().join("storage");

        let mut config = AppConfig {
            storage: StorageConfig::Filesystem {
                path: storage_path,
            },
            ..AppConfig::default()
        };
        modifier(&mut config);

        let storage = docket_storage::from_config(&config.storage)
            .await
            .expect("Failed to create storage backend");
        let state = AppState::new(config, storage);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            temp_dir,
        }
    }

    /// Rebuild the server over the same storage, as after a restart.
    ///
    /// Only meaningful for filesystem storage.
    pub async fn restart(self) -> Self {
        let config = (*self.state.config).clone();
        let storage = docket_storage::from_config(&config.storage)
            .await
            .expect("Failed to reopen storage backend");
        let state = AppState::new(config, storage);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            temp_dir: self.temp_dir,
        }
    }

    /// Send a request and decode the JSON response (Null when empty or not JSON).
    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.raw(request).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Send a request and return the raw response body.
    pub async fn raw(&self, request: Request<Body>) -> (StatusCode, bytes::Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    /// Send a JSON request.
    pub async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_vec(&v).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.request(request).await
    }

    /// Upload one file through the multipart endpoint.
    pub async fn upload(&self, ticket: &str, file_name: &str, data: &[u8]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/v1/tickets/{ticket}/upload"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body("file", Some(file_name), data)))
            .unwrap();
        self.request(request).await
    }
}

/// Build a single-part multipart/form-data body.
#[allow(dead_code)]
pub fn multipart_body(field: &str, file_name: Option<&str>, data: &[u8]) -> Vec<u8> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}
