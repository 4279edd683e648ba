//! Common test utilities: the proxy router wired to a mock provider server

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use veoproxy_core::{VeoClient, VeoConfig};
use veoproxy_server::{build_router, ApiState};

/// Test API key
pub const TEST_API_KEY: &str = "test-api-key-12345";

/// File name the mock upload endpoint assigns
pub const MOCK_UPLOAD_NAME: &str = "files/upload123";

/// Operation name the mock job endpoint assigns
pub const MOCK_OPERATION_NAME: &str = "operations/op-123";

/// State for the mock provider
#[derive(Default)]
pub struct MockProviderState {
    /// Scripted operation-status replies, consumed front to back;
    /// `{"done": false}` once exhausted
    pub status_replies: RwLock<VecDeque<Value>>,
    /// Total requests observed, across all endpoints
    pub request_count: RwLock<u32>,
}

impl MockProviderState {
    pub async fn push_status(&self, reply: Value) {
        self.status_replies.write().await.push_back(reply);
    }

    pub async fn requests(&self) -> u32 {
        *self.request_count.read().await
    }
}

/// Start a mock provider server on an ephemeral port
pub async fn start_mock_provider() -> (SocketAddr, Arc<MockProviderState>) {
    let state = Arc::new(MockProviderState::default());

    let app = Router::new()
        .route("/upload/v1beta/files", post(upload_file))
        .route("/v1beta/models/:model", post(start_job))
        .route("/v1beta/operations/:id", get(operation_status))
        .route("/v1beta/files/:tail", get(file_endpoint))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    (addr, state)
}

/// The proxy router backed by a fresh mock provider
pub async fn proxy_with_mock() -> (Router, Arc<MockProviderState>) {
    let (addr, state) = start_mock_provider().await;
    let client = VeoClient::new(
        VeoConfig::default()
            .with_api_base(format!("http://{addr}"))
            .with_api_key(TEST_API_KEY)
            .with_poll_interval(Duration::from_millis(25)),
    );
    let router = build_router(Arc::new(ApiState { client }));
    (router, state)
}

/// The proxy router with no credential configured
pub async fn credentialless_proxy() -> (Router, Arc<MockProviderState>) {
    let (addr, state) = start_mock_provider().await;
    let client = VeoClient::new(
        VeoConfig::default()
            .with_api_base(format!("http://{addr}"))
            .with_poll_interval(Duration::from_millis(25)),
    );
    let router = build_router(Arc::new(ApiState { client }));
    (router, state)
}

async fn upload_file(
    State(state): State<Arc<MockProviderState>>,
    body: axum::body::Bytes,
) -> impl IntoResponse {
    *state.request_count.write().await += 1;
    Json(json!({
        "name": MOCK_UPLOAD_NAME,
        "uri": "https://files.example.test/upload123",
        "sizeBytes": body.len().to_string(),
    }))
}

async fn start_job(
    State(state): State<Arc<MockProviderState>>,
    Path(_model): Path<String>,
    Json(_body): Json<Value>,
) -> impl IntoResponse {
    *state.request_count.write().await += 1;
    Json(json!({ "name": MOCK_OPERATION_NAME, "done": false }))
}

async fn operation_status(
    State(state): State<Arc<MockProviderState>>,
    Path(_id): Path<String>,
) -> impl IntoResponse {
    *state.request_count.write().await += 1;
    let reply = state
        .status_replies
        .write()
        .await
        .pop_front()
        .unwrap_or_else(|| json!({ "done": false }));
    Json(reply)
}

async fn file_endpoint(
    State(state): State<Arc<MockProviderState>>,
    Path(tail): Path<String>,
) -> Response {
    *state.request_count.write().await += 1;

    if tail.ends_with(":download") {
        (
            [(header::CONTENT_TYPE, "video/mp4")],
            b"MOCKVIDEO".to_vec(),
        )
            .into_response()
    } else {
        Json(json!({ "name": format!("files/{tail}") })).into_response()
    }
}
