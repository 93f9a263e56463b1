//! Vision model providers.
//!
//! The estimation pipeline only needs one thing from a model: given a
//! system prompt, a user prompt and a photo, return some text.  The
//! [`VisionProvider`] trait captures that seam so the orchestration in
//! [`crate::engine`] can be exercised with a stub, while
//! [`OpenAiProvider`] talks to an OpenAI-compatible chat-completions
//! endpoint.  Providers do not retry; a failed call is reported as
//! [`EstimateError::ProviderError`] and the user decides whether to try
//! again.

use crate::error::EstimateError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// The job photo, either inline or hosted.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Base64 { data: String, media_type: String },
    Url(String),
}

impl ImageSource {
    /// Inline image with the media type guessed from the photo's
    /// original file name or URI, if known.
    pub fn inline(data: impl Into<String>, file_name: Option<&str>) -> Self {
        Self::Base64 {
            data: data.into(),
            media_type: media_type_for(file_name.unwrap_or_default()).to_string(),
        }
    }

    /// The value placed in the request's `image_url.url` field.
    pub fn to_url(&self) -> String {
        match self {
            Self::Base64 { data, media_type } => format!("data:{media_type};base64,{data}"),
            Self::Url(url) => url.clone(),
        }
    }
}

/// Media type from a file name or URL extension, defaulting to JPEG.
pub fn media_type_for(uri: &str) -> &'static str {
    let extension = uri.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// A model that can look at a photo and answer in text.
///
/// Providers must be thread-safe (`Send + Sync`); the HTTP layer shares
/// a single instance across requests.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image: &ImageSource,
    ) -> Result<String, EstimateError>;
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Absent keys are reported when a call is attempted.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_seconds: 60,
            max_tokens: 2000,
        }
    }
}

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, EstimateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EstimateError::provider(None, format!("Failed to create HTTP client: {e}")))?;

        tracing::info!(model = %config.model, base_url = %config.base_url, "vision provider initialized");

        Ok(Self { client, config })
    }

    fn request_body(&self, system_prompt: &str, user_prompt: &str, image: &ImageSource) -> serde_json::Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": user_prompt },
                        { "type": "image_url", "image_url": { "url": image.to_url(), "detail": "high" } }
                    ]
                }
            ],
            "max_tokens": self.config.max_tokens,
            "response_format": { "type": "json_object" }
        })
    }
}

#[async_trait]
impl VisionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image: &ImageSource,
    ) -> Result<String, EstimateError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| EstimateError::provider(None, "OpenAI API key is required"))?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, "vision request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(system_prompt, user_prompt, image))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "vision request failed");
                EstimateError::provider(None, format!("Vision service unavailable: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| format!("OpenAI API error: {}", status.as_u16()));
            return Err(EstimateError::provider(Some(status.as_u16()), message));
        }

        let completion: ChatCompletion = response.json().await.map_err(|e| {
            EstimateError::provider(Some(status.as_u16()), format!("Invalid completion body: {e}"))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| EstimateError::provider(Some(status.as_u16()), "No response from OpenAI"))
    }
}
