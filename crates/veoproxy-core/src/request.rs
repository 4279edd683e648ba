//! Generation request types and the model identifier table

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Model family selector exposed to callers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelVariant {
    /// Veo 2 generation models
    #[serde(rename = "veo-2")]
    Veo2,

    /// Veo 3 preview models
    #[default]
    #[serde(rename = "veo-3")]
    Veo3,
}

impl ModelVariant {
    /// Map `(model, fast)` to the provider model identifier. The table is
    /// total over the declared enumeration; there is no fallback guessing.
    pub fn model_id(self, fast: bool) -> &'static str {
        match (self, fast) {
            (Self::Veo2, false) => "veo-2.0-generate-001",
            (Self::Veo2, true) => "veo-2.0-fast-generate-001",
            (Self::Veo3, false) => "veo-3.0-generate-preview",
            (Self::Veo3, true) => "veo-3.0-fast-generate-preview",
        }
    }
}

/// Supported aspect ratios; a closed enumeration, currently a single value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 landscape
    #[default]
    #[serde(rename = "16:9")]
    Widescreen,
}

impl AspectRatio {
    /// Wire form of the ratio
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Widescreen => "16:9",
        }
    }
}

/// Person-generation policy forwarded to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonGeneration {
    /// Allow generating all people
    AllowAll,
    /// Allow generating adults only
    AllowAdult,
    /// Disallow generating people
    DontAllow,
}

impl PersonGeneration {
    /// Wire form of the policy
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllowAll => "allow_all",
            Self::AllowAdult => "allow_adult",
            Self::DontAllow => "dont_allow",
        }
    }
}

/// Opaque reference to provider-held binary content.
///
/// Either a bare file id (normalizable to the canonical `files/{id}` form) or
/// an absolute URL, which means "already resolved, redirect directly".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileReference(String);

impl FileReference {
    /// Wrap a raw identifier or URL
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The reference as given
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is an absolute `http(s)` URL (some backends return
    /// signed URLs as the canonical representation)
    pub fn is_absolute_url(&self) -> bool {
        Url::parse(&self.0)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }

    /// Canonical `files/{id}` form. Idempotent: an already-prefixed
    /// reference and an absolute URL pass through unchanged.
    pub fn canonical(&self) -> String {
        if self.is_absolute_url() || self.0.starts_with("files/") {
            self.0.clone()
        } else {
            format!("files/{}", self.0)
        }
    }
}

impl std::fmt::Display for FileReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A video generation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Text prompt describing the video; must be non-empty
    pub prompt: String,

    /// What to avoid generating
    pub negative_prompt: Option<String>,

    /// Output aspect ratio
    pub aspect_ratio: AspectRatio,

    /// Person-generation policy, if the caller wants one enforced
    pub person_generation: Option<PersonGeneration>,

    /// Previously uploaded image used as the starting frame
    pub image: Option<FileReference>,

    /// Model family
    pub model: ModelVariant,

    /// Use the fast variant of the selected model family
    pub fast: bool,
}

impl GenerationRequest {
    /// A request with the given prompt and default options
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Validate required fields, listing every offending field on failure
    pub fn validate(&self) -> Result<()> {
        let mut offending = Vec::new();

        if self.prompt.trim().is_empty() {
            offending.push("prompt: must not be empty");
        }
        if let Some(image) = &self.image {
            if image.as_str().trim().is_empty() {
                offending.push("image: empty file reference");
            }
        }

        if offending.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "invalid generation request: {}",
                offending.join(", ")
            )))
        }
    }
}
