//! Auto-captioning of uploaded photos.
//!
//! A [`Captioner`] turns an encoded image into a `{title, category,
//! description}` triple. The upload pipeline never sees its errors: it goes
//! through [`caption_or_fallback`], which maps a missing key and every other
//! failure to two fixed placeholder triples so an upload always completes.
//!
//! The production captioner is [`GeminiCaptioner`], a blocking client for the
//! Gemini `generateContent` REST endpoint that asks for a JSON response
//! matching the triple's schema.

use crate::config::CaptionConfig;
use crate::upload::EncodedImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("no captioning API key configured")]
    MissingCredentials,
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("captioning response had no text")]
    EmptyResponse,
    #[error("captioning response is missing '{0}'")]
    Incomplete(&'static str),
}

/// Display metadata proposed for a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caption {
    pub title: String,
    pub category: String,
    pub description: String,
}

impl Caption {
    pub fn new(title: impl Into<String>, category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            description: description.into(),
        }
    }

    /// Placeholder used when no API key is available.
    pub fn missing_credentials() -> Self {
        Self::new("New Capture", "Archive", "A moment preserved in the gallery.")
    }

    /// Placeholder used when the API call fails for any other reason.
    pub fn failed() -> Self {
        Self::new("Untitled Composition", "General", "Captured light and shadow.")
    }

    fn validated(self) -> Result<Self, CaptionError> {
        let caption = Self {
            title: self.title.trim().to_string(),
            category: self.category.trim().to_string(),
            description: self.description.trim().to_string(),
        };
        if caption.title.is_empty() {
            return Err(CaptionError::Incomplete("title"));
        }
        if caption.category.is_empty() {
            return Err(CaptionError::Incomplete("category"));
        }
        Ok(caption)
    }
}

/// Where a photo's caption came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSource {
    Api,
    Cache,
    MissingCredentials,
    Failed,
}

impl CaptionSource {
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::MissingCredentials | Self::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Api => "captioned",
            Self::Cache => "cached caption",
            Self::MissingCredentials => "no API key, placeholder",
            Self::Failed => "captioning failed, placeholder",
        }
    }
}

pub trait Captioner {
    fn caption(&self, image: &EncodedImage) -> Result<Caption, CaptionError>;
}

/// Caption an image, substituting the fixed placeholders on any failure.
pub fn caption_or_fallback(captioner: &dyn Captioner, image: &EncodedImage) -> (Caption, CaptionSource) {
    match captioner.caption(image) {
        Ok(caption) => (caption, CaptionSource::Api),
        Err(CaptionError::MissingCredentials) => {
            log::warn!("captioning API key is missing, using placeholder metadata");
            (Caption::missing_credentials(), CaptionSource::MissingCredentials)
        }
        Err(e) => {
            log::warn!("captioning failed for {}: {e}", image.file_name);
            (Caption::failed(), CaptionSource::Failed)
        }
    }
}

/// Captioner used when captioning is disabled in config.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCaptioner;

impl Captioner for DisabledCaptioner {
    fn caption(&self, _image: &EncodedImage) -> Result<Caption, CaptionError> {
        Err(CaptionError::MissingCredentials)
    }
}

// ============================================================================
// Gemini client
// ============================================================================

pub struct GeminiCaptioner {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    prompt: String,
    api_key: Option<String>,
}

impl GeminiCaptioner {
    pub fn new(config: &CaptionConfig, api_key: Option<String>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();
        Self {
            agent,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            api_key,
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body(&self, image: &EncodedImage) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": image.mime,
                            "data": image.base64(),
                        }
                    },
                    { "text": self.prompt },
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "category": { "type": "STRING" },
                        "description": { "type": "STRING" },
                    },
                    "required": ["title", "category", "description"],
                },
            },
        })
    }
}

impl Captioner for GeminiCaptioner {
    fn caption(&self, image: &EncodedImage) -> Result<Caption, CaptionError> {
        let key = self.api_key.as_deref().ok_or(CaptionError::MissingCredentials)?;
        log::debug!("captioning {} via {}", image.file_name, self.model);
        let mut response = self
            .agent
            .post(&self.url())
            .header("x-goog-api-key", key)
            .send_json(self.request_body(image))?;
        let body: GenerateResponse = response.body_mut().read_json()?;
        parse_response(body)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

fn parse_response(response: GenerateResponse) -> Result<Caption, CaptionError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = strip_code_fence(text.trim());
    if text.is_empty() {
        return Err(CaptionError::EmptyResponse);
    }
    let caption: Caption = serde_json::from_str(text)?;
    caption.validated()
}

/// Models occasionally wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
