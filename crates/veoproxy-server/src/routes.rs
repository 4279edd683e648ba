//! HTTP routes for the video proxy.
//!
//! Every handler is a thin adapter: decode the request, call one
//! [`VeoClient`] operation, encode the outcome. Error bodies are JSON
//! `{"error": "..."}` objects; the status code comes from the error variant.

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, warn};
use veoproxy_core::{
    AspectRatio, Download, Error, FileReference, GenerationRequest, ModelVariant,
    PersonGeneration, VeoClient,
};

/// Upload size cap; generous enough for a starting-frame image
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Filename advertised on streamed downloads
const DOWNLOAD_FILENAME: &str = "veo3_video.mp4";

/// Shared state for route handlers
pub struct ApiState {
    /// Provider client shared by all handlers
    pub client: VeoClient,
}

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /api/video/start`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartVideoRequest {
    /// Text prompt describing the video
    #[serde(default)]
    pub prompt: String,

    /// What to avoid generating
    #[serde(default)]
    pub negative_prompt: Option<String>,

    /// Output aspect ratio
    #[serde(default)]
    pub aspect_ratio: AspectRatio,

    /// Person-generation policy
    #[serde(default)]
    pub person_generation: Option<PersonGeneration>,

    /// Starting-frame image as a bare upload id
    #[serde(default)]
    pub image_file_id: Option<String>,

    /// Starting-frame image as a full reference; wins over `imageFileId`
    #[serde(default)]
    pub image_file_uri: Option<String>,

    /// Use the fast variant of the selected model family
    #[serde(default)]
    pub fast: bool,

    /// Model family
    #[serde(default)]
    pub model: ModelVariant,
}

impl StartVideoRequest {
    fn into_generation(self) -> GenerationRequest {
        let image = self
            .image_file_uri
            .or(self.image_file_id)
            .filter(|reference| !reference.trim().is_empty())
            .map(FileReference::new);

        GenerationRequest {
            prompt: self.prompt,
            negative_prompt: self.negative_prompt.filter(|n| !n.trim().is_empty()),
            aspect_ratio: self.aspect_ratio,
            person_generation: self.person_generation,
            image,
            model: self.model,
            fast: self.fast,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OperationQuery {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WaitQuery {
    name: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadQuery {
    file_uri: Option<String>,
}

// ============================================================================
// Router Builder
// ============================================================================

/// Build the proxy router
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/files/upload",
            post(upload_file)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES)),
        )
        .route("/api/video/start", post(start_video))
        .route("/api/video/status", get(video_status))
        .route("/api/video/wait", get(wait_for_video))
        .route("/api/video/download", get(download_video))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_check(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "credentialConfigured": state.client.config().has_credential(),
    }))
}

/// `POST /api/files/upload`: relay the multipart `file` field to the provider
async fn upload_file(State(state): State<Arc<ApiState>>, mut multipart: Multipart) -> Response {
    let mut file: Option<(Vec<u8>, String)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return error_response(Error::Validation(format!(
                    "malformed multipart body: {err}"
                )))
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        match field.bytes().await {
            Ok(bytes) => file = Some((bytes.to_vec(), mime_type)),
            Err(err) => {
                return error_response(Error::Validation(format!(
                    "failed to read file field: {err}"
                )))
            }
        }
    }

    let Some((bytes, mime_type)) = file else {
        return error_response(Error::Validation("missing 'file' field".to_string()));
    };
    if bytes.is_empty() {
        return error_response(Error::Validation("uploaded file is empty".to_string()));
    }

    match state.client.upload(bytes, &mime_type).await {
        Ok(uploaded) => Json(json!({
            "id": uploaded.name,
            "uri": uploaded.uri,
            "meta": uploaded.raw,
        }))
        .into_response(),
        Err(err) => error_response(err),
    }
}

/// `POST /api/video/start`: validate and submit a generation job
async fn start_video(State(state): State<Arc<ApiState>>, body: axum::body::Bytes) -> Response {
    let request: StartVideoRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            return error_response(Error::Validation(format!("invalid request body: {err}")))
        }
    };

    match state.client.start(&request.into_generation()).await {
        Ok(operation) => Json(operation).into_response(),
        Err(err) => error_response(err),
    }
}

/// `GET /api/video/status?name=...`: one resolver pass, no waiting
async fn video_status(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<OperationQuery>,
) -> Response {
    let Some(name) = query.name.filter(|name| !name.trim().is_empty()) else {
        return error_response(Error::Validation(
            "missing 'name' query parameter".to_string(),
        ));
    };

    match state.client.fetch_status(&name).await {
        Ok(status) => Json(status).into_response(),
        Err(err) => error_response(err),
    }
}

/// `GET /api/video/wait?name=...&timeoutMs=...`: block until the operation
/// resolves, then redirect to the download route
async fn wait_for_video(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<WaitQuery>,
) -> Response {
    let Some(name) = query.name.filter(|name| !name.trim().is_empty()) else {
        return error_response(Error::Validation(
            "missing 'name' query parameter".to_string(),
        ));
    };
    let timeout = query.timeout_ms.map(Duration::from_millis);

    match state.client.wait_for_completion(&name, timeout).await {
        Ok(status) => match status.file_uri {
            Some(file_uri) => {
                info!(operation = %name, file = %file_uri, "operation resolved, redirecting");
                let encoded: String =
                    url::form_urlencoded::byte_serialize(file_uri.as_bytes()).collect();
                let location = format!("/api/video/download?fileUri={encoded}");
                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
            }
            None => error_response(Error::MissingResult { raw: status.raw }),
        },
        Err(err) => error_response(err),
    }
}

/// `GET /api/video/download?fileUri=...`: 302 to an already-resolved URL or
/// stream the provider bytes through
async fn download_video(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let Some(file_uri) = query.file_uri.filter(|uri| !uri.trim().is_empty()) else {
        return error_response(Error::Validation(
            "missing 'fileUri' query parameter".to_string(),
        ));
    };

    match state.client.download(&FileReference::new(file_uri)).await {
        Ok(Download::Redirect(url)) => {
            (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
        }
        Ok(Download::Stream {
            content_type,
            response,
        }) => {
            let content_type = if content_type.is_empty() {
                "video/mp4".to_string()
            } else {
                content_type
            };
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename={DOWNLOAD_FILENAME}"),
                    ),
                    (header::CACHE_CONTROL, "no-store".to_string()),
                ],
                Body::from_stream(response.bytes_stream()),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Map a client error onto an HTTP status and a JSON error body
fn error_response(err: Error) -> Response {
    let status = match &err {
        Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        Error::Upstream { .. }
        | Error::Network(_)
        | Error::Operation(_)
        | Error::MissingResult { .. } => StatusCode::BAD_GATEWAY,
    };
    warn!(status = %status, error = %err, "request failed");

    match err {
        Error::Timeout { last } => (
            status,
            Json(json!({
                "error": "timed out waiting for video generation",
                "last": last,
            })),
        )
            .into_response(),
        Error::MissingResult { raw } => (
            status,
            Json(json!({
                "error": "operation finished without a video result",
                "done": true,
                "raw": raw,
            })),
        )
            .into_response(),
        other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
    }
}
