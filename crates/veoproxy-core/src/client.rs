//! HTTP client for the provider's upload, job, operation and file endpoints

use crate::config::{VeoConfig, API_KEY_ENV};
use crate::error::{Error, Result};
use crate::request::{FileReference, GenerationRequest};
use crate::status::{first_string, NormalizedStatus, DOWNLOAD_URI_KEYS};
use reqwest::header;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// A provider-side file created by the Upload Relay
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Resource name, like `files/abc123`
    pub name: String,

    /// Download URI; falls back to the resource name when the provider
    /// omits one
    pub uri: String,

    /// Raw file metadata as returned by the provider
    pub raw: Value,
}

/// Handle to a provider-side long-running job
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Operation {
    /// Opaque operation name assigned by the provider
    pub name: String,

    /// Terminal flag; false at creation
    #[serde(default)]
    pub done: bool,
}

/// Outcome of resolving a [`FileReference`] into downloadable content
#[derive(Debug)]
pub enum Download {
    /// The caller should redirect to this URL
    Redirect(String),

    /// Provider bytes to stream through unmodified
    Stream {
        /// Upstream content type (may be empty)
        content_type: String,
        /// The open provider response; consume via `bytes_stream()`
        response: reqwest::Response,
    },
}

/// Client for the provider HTTP API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct VeoClient {
    http: reqwest::Client,
    config: VeoConfig,
}

impl VeoClient {
    /// Create a client over the given configuration
    pub fn new(config: VeoConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// The client's configuration
    pub fn config(&self) -> &VeoConfig {
        &self.config
    }

    /// The credential, or a configuration error before any network call
    fn credential(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config(format!("missing {API_KEY_ENV}")))
    }

    /// Forward a binary payload to the provider's raw-protocol upload
    /// endpoint and return the assigned file identifier and URI.
    pub async fn upload(&self, bytes: Vec<u8>, mime_type: &str) -> Result<UploadedFile> {
        let key = self.credential()?;
        let length = bytes.len();
        info!(bytes = length, mime = mime_type, "uploading file to provider");

        let url = format!("{}/upload/v1beta/files", self.config.api_base);
        let response = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .header("X-Goog-Upload-Protocol", "raw")
            .header(header::CONTENT_TYPE, mime_type)
            .header("X-Goog-Upload-Header-Content-Length", length.to_string())
            .header(header::CONTENT_LENGTH, length.to_string())
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(response).await);
        }

        let raw: Value = response.json().await?;
        let name = match raw.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(Error::Upstream {
                    status: status.as_u16(),
                    body: format!("upload reply carried no file name: {raw}"),
                })
            }
        };
        let uri = raw
            .get("uri")
            .and_then(Value::as_str)
            .unwrap_or(&name)
            .to_string();

        debug!(file = %name, "upload complete");
        Ok(UploadedFile { name, uri, raw })
    }

    /// Validate a generation request, map it to a provider model identifier
    /// and submit the long-running job.
    pub async fn start(&self, request: &GenerationRequest) -> Result<Operation> {
        request.validate()?;
        let key = self.credential()?;

        let model_id = request.model.model_id(request.fast);
        info!(model = model_id, "starting video generation job");

        let mut instance = json!({ "prompt": request.prompt });
        if let Some(image) = &request.image {
            // Attach reference to the uploaded image as the starting frame
            instance["image"] = json!({ "fileUri": image.canonical() });
        }

        let mut parameters = json!({ "aspectRatio": request.aspect_ratio.as_str() });
        if let Some(negative) = &request.negative_prompt {
            parameters["negativePrompt"] = json!(negative);
        }
        if let Some(person) = request.person_generation {
            parameters["personGeneration"] = json!(person.as_str());
        }

        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.config.api_base, model_id
        );
        let response = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .json(&json!({ "instances": [instance], "parameters": parameters }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(response).await);
        }

        let raw: Value = response.json().await?;
        let name = match raw.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(Error::Upstream {
                    status: status.as_u16(),
                    body: format!("job creation reply carried no operation name: {raw}"),
                })
            }
        };
        let done = raw.get("done").and_then(Value::as_bool).unwrap_or(false);

        info!(operation = %name, "job accepted by provider");
        Ok(Operation { name, done })
    }

    /// Fetch the operation resource once and normalize it.
    ///
    /// Malformed or absent result fields are absent data in the normalized
    /// status, not errors; only transport and non-2xx failures error here.
    pub async fn fetch_status(&self, name: &str) -> Result<NormalizedStatus> {
        let key = self.credential()?;
        debug!(operation = name, "fetching operation status");

        let url = format!("{}/v1beta/{}", self.config.api_base, name);
        let response = self.http.get(&url).query(&[("key", key)]).send().await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let raw: Value = response.json().await?;
        Ok(NormalizedStatus::from_raw(raw))
    }

    /// Fetch a file's metadata record.
    pub async fn file_metadata(&self, name: &str) -> Result<Value> {
        let key = self.credential()?;
        let url = format!("{}/v1beta/{}", self.config.api_base, name);
        let response = self.http.get(&url).query(&[("key", key)]).send().await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Resolve a file reference to a redirect target or a byte stream.
    ///
    /// An absolute URL redirects directly without contacting the provider.
    /// Otherwise the download endpoint is tried first (a JSON reply there is
    /// a redirect envelope, anything else is streamed through), falling back
    /// to the metadata record for a downloadable URI.
    pub async fn download(&self, reference: &FileReference) -> Result<Download> {
        let key = self.credential()?;

        if reference.is_absolute_url() {
            debug!(uri = reference.as_str(), "redirecting to signed URL");
            return Ok(Download::Redirect(reference.as_str().to_string()));
        }

        let name = reference.canonical();
        info!(file = %name, "resolving file download");

        let url = format!("{}/v1beta/{}:download", self.config.api_base, name);
        let response = self.http.get(&url).query(&[("key", key)]).send().await?;

        let mut last_status = response.status().as_u16();
        if response.status().is_success() {
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();

            if content_type.contains("application/json") {
                // Some backends answer with a JSON envelope holding a signed URI
                let envelope: Value = response.json().await?;
                if let Some(uri) = first_string(&envelope, DOWNLOAD_URI_KEYS) {
                    return Ok(Download::Redirect(uri));
                }
                warn!(file = %name, "download envelope carried no URI, trying metadata");
            } else {
                return Ok(Download::Stream {
                    content_type,
                    response,
                });
            }
        } else {
            warn!(
                file = %name,
                status = last_status,
                "download endpoint refused, trying metadata"
            );
        }

        // Fallback: the metadata record sometimes carries a downloadable URI
        match self.file_metadata(&name).await {
            Ok(meta) => {
                if let Some(uri) = first_string(&meta, DOWNLOAD_URI_KEYS) {
                    return Ok(Download::Redirect(uri));
                }
            }
            Err(Error::Upstream { status, .. }) => last_status = status,
            Err(other) => return Err(other),
        }

        Err(Error::Upstream {
            status: last_status,
            body: "no downloadable bytes or redirect target for file".to_string(),
        })
    }
}

/// Turn a non-2xx provider reply into an [`Error::Upstream`] carrying the
/// upstream status code and body.
async fn upstream_error(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Error::Upstream { status, body }
}
