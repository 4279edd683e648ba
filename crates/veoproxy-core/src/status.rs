//! Normalization of heterogeneous operation-status payloads.
//!
//! The provider's response schema is not consistent across backends and
//! versions: field names arrive in camelCase or snake_case, and the
//! `response`/`metadata` objects are sometimes wrapped in a `value` envelope.
//! Rather than a fixed schema, extraction is an ordered list of candidate
//! accessor paths evaluated until one yields a value, returned as an explicit
//! optional result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys under which the generated-result array may appear
const RESULT_LIST_KEYS: &[&str] = &["generatedVideos", "generated_videos", "videos", "results"];

/// Keys under which a result entry nests its video object
const VIDEO_OBJECT_KEYS: &[&str] = &["video", "video_result", "result"];

/// Direct URI fields on a video object
const URI_KEYS: &[&str] = &["uri", "fileUri", "file_uri", "mediaUri", "media_uri"];

/// Keys under which a video object nests a file/media sub-object
const FILE_OBJECT_KEYS: &[&str] = &["file", "output_file", "result_file", "media", "content"];

/// URI fields on a nested file object; `name` is accepted here because file
/// records expose their `files/{id}` resource name
const FILE_URI_KEYS: &[&str] = &["uri", "fileUri", "file_uri", "mediaUri", "media_uri", "name"];

/// Last-resort bare file-id fields
const FILE_ID_KEYS: &[&str] = &["fileId", "file_id"];

/// Progress fields optionally exposed in operation metadata
const PROGRESS_KEYS: &[&str] = &["progress", "percent", "progress_percent", "progressPercent"];

/// Stage fields optionally exposed in operation metadata
const STAGE_KEYS: &[&str] = &["stage", "state", "status"];

/// URI fields probed in download/metadata envelopes
pub(crate) const DOWNLOAD_URI_KEYS: &[&str] = &[
    "uri",
    "downloadUri",
    "download_uri",
    "fileUri",
    "file_uri",
    "mediaUri",
    "media_uri",
];

/// Terminal failure payload attached to an operation by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationFailure {
    /// Provider error code, if present
    pub code: Option<i64>,

    /// Human-readable failure message
    pub message: String,

    /// Provider status string (e.g. `INVALID_ARGUMENT`), if present
    pub status: Option<String>,
}

impl OperationFailure {
    fn from_raw(raw: &Value) -> Self {
        Self {
            code: raw.get("code").and_then(Value::as_i64),
            message: raw
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| raw.to_string()),
            status: raw
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// This system's uniform view of provider status across schema variants.
///
/// Derived fresh on every status fetch, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStatus {
    /// Terminal flag; monotonic false to true on the provider side
    pub done: bool,

    /// Extracted video file reference. `None` while running, and `None`
    /// when a done operation carried no recognizable result (a reportable
    /// anomaly, not a crash).
    pub file_uri: Option<String>,

    /// Completion percentage, if the backend exposes one
    pub progress: Option<f64>,

    /// Pipeline stage label, if the backend exposes one
    pub stage: Option<String>,

    /// Terminal failure payload, distinct from transport failure
    pub error: Option<OperationFailure>,

    /// The raw operation resource the fields above were derived from
    pub raw: Value,
}

impl NormalizedStatus {
    /// Normalize a raw operation resource.
    pub fn from_raw(raw: Value) -> Self {
        let done = raw.get("done").and_then(Value::as_bool).unwrap_or(false);
        let file_uri = if done { extract_file_uri(&raw) } else { None };

        let meta = raw.get("metadata").map(unwrap_envelope);
        let progress = meta.and_then(|m| first_number(m, PROGRESS_KEYS));
        let stage = meta.and_then(|m| first_string(m, STAGE_KEYS));

        let error = raw
            .get("error")
            .filter(|e| !e.is_null())
            .map(OperationFailure::from_raw);

        Self {
            done,
            file_uri,
            progress,
            stage,
            error,
            raw,
        }
    }
}

/// Unwrap a nested `{"value": {...}}` envelope some backends wrap the
/// `response`/`metadata` objects in.
fn unwrap_envelope(value: &Value) -> &Value {
    match value.get("value") {
        Some(inner) if inner.is_object() => inner,
        _ => value,
    }
}

fn first_value<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(key))
        .find(|v| !v.is_null())
}

/// First non-empty string under any of `keys`
pub(crate) fn first_string(object: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(key))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_number(object: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| object.get(key))
        .find_map(Value::as_f64)
}

/// Ordered extraction of the generated video's file reference, evaluated
/// only once the operation is done.
fn extract_file_uri(raw: &Value) -> Option<String> {
    let response = unwrap_envelope(raw.get("response")?);
    let list = first_value(response, RESULT_LIST_KEYS)?.as_array()?;
    let entry = list.first()?;

    // The video may be nested under a known key or be the entry itself
    let video = first_value(entry, VIDEO_OBJECT_KEYS).unwrap_or(entry);

    if let Some(uri) = video.as_str() {
        return Some(uri.to_string());
    }
    if let Some(uri) = first_string(video, URI_KEYS) {
        return Some(uri);
    }
    if let Some(file) = first_value(video, FILE_OBJECT_KEYS) {
        if let Some(uri) = first_string(file, FILE_URI_KEYS) {
            return Some(uri);
        }
    }
    // Sometimes only a bare id is provided, on the video or its parent
    first_string(video, FILE_ID_KEYS).or_else(|| first_string(entry, FILE_ID_KEYS))
}
