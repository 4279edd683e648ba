//! Common test utilities: a mock provider server for lifecycle testing

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
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

/// Test API key
pub const TEST_API_KEY: &str = "test-api-key-12345";

/// File name the mock upload endpoint assigns
pub const MOCK_UPLOAD_NAME: &str = "files/upload123";

/// Operation name the mock job endpoint assigns
pub const MOCK_OPERATION_NAME: &str = "operations/op-123";

/// URI the mock metadata endpoint exposes
pub const MOCK_METADATA_URI: &str = "https://files.example.test/meta-uri";

/// What the mock download endpoint should answer with
pub enum DownloadReply {
    /// Binary bytes with a content type
    Bytes(Vec<u8>, String),
    /// A JSON redirect envelope
    JsonEnvelope(Value),
    /// A bare status code
    Status(u16),
}

impl Default for DownloadReply {
    fn default() -> Self {
        Self::Bytes(b"MOCKVIDEO".to_vec(), "video/mp4".to_string())
    }
}

/// State for the mock provider
#[derive(Default)]
pub struct MockProviderState {
    /// Scripted operation-status replies, consumed front to back;
    /// `{"done": false}` once exhausted
    pub status_replies: RwLock<VecDeque<Value>>,
    /// Total requests observed, across all endpoints
    pub request_count: RwLock<u32>,
    /// Model id of the last job submission
    pub last_model: RwLock<Option<String>>,
    /// Body of the last job submission
    pub last_start_body: RwLock<Option<Value>>,
    /// Configured download behavior
    pub download_reply: RwLock<DownloadReply>,
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

/// A client pointed at the mock provider, with a fast poll interval
pub fn test_client(addr: SocketAddr) -> VeoClient {
    VeoClient::new(
        VeoConfig::default()
            .with_api_base(format!("http://{addr}"))
            .with_api_key(TEST_API_KEY)
            .with_poll_interval(Duration::from_millis(25)),
    )
}

/// A client pointed at the mock provider with no credential configured
pub fn credentialless_client(addr: SocketAddr) -> VeoClient {
    VeoClient::new(
        VeoConfig::default()
            .with_api_base(format!("http://{addr}"))
            .with_poll_interval(Duration::from_millis(25)),
    )
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
    Path(model): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    *state.request_count.write().await += 1;
    let model = model
        .strip_suffix(":predictLongRunning")
        .unwrap_or(&model)
        .to_string();
    *state.last_model.write().await = Some(model);
    *state.last_start_body.write().await = Some(body);
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
        match &*state.download_reply.read().await {
            DownloadReply::Bytes(bytes, content_type) => (
                [(header::CONTENT_TYPE, content_type.clone())],
                bytes.clone(),
            )
                .into_response(),
            DownloadReply::JsonEnvelope(envelope) => Json(envelope.clone()).into_response(),
            DownloadReply::Status(code) => StatusCode::from_u16(*code)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                .into_response(),
        }
    } else {
        Json(json!({ "name": format!("files/{tail}"), "uri": MOCK_METADATA_URI })).into_response()
    }
}
