//! OpenAI image edits provider (gpt-image-1).

use crate::error::{sanitize_error_message, CowifyError, Result};
use crate::image::provider::ImageEditor;
use crate::image::types::{GenerationMetadata, StyleRequest, StylizedImage};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const EDITS_PATH: &str = "/images/edits";
const DEFAULT_SIZE: &str = "1024x1024";

/// File name the user's photo is sent under.
const UPLOAD_FILE_NAME: &str = "upload.png";

/// Message relayed when the API fails without explaining why.
const GENERIC_UPSTREAM_MESSAGE: &str = "OpenAI request failed.";

/// OpenAI image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenAiImageModel {
    /// GPT Image 1 - accepts several input images per edit.
    #[default]
    GptImage1,
}

impl OpenAiImageModel {
    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GptImage1 => "gpt-image-1",
        }
    }
}

/// Builder for OpenAiImageProvider.
#[derive(Debug, Clone, Default)]
pub struct OpenAiImageProviderBuilder {
    api_key: Option<String>,
    model: OpenAiImageModel,
    base_url: Option<String>,
}

impl OpenAiImageProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `OPENAI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the OpenAI image model variant.
    pub fn model(mut self, model: OpenAiImageModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API base URL (default: `https://api.openai.com/v1`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<OpenAiImageProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                CowifyError::ConfigurationMissing(
                    "OPENAI_API_KEY not set and no API key provided".into(),
                )
            })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(OpenAiImageProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            edits_url: format!("{}{EDITS_PATH}", base_url.trim_end_matches('/')),
        })
    }
}

/// OpenAI image edits provider.
pub struct OpenAiImageProvider {
    client: reqwest::Client,
    api_key: String,
    model: OpenAiImageModel,
    edits_url: String,
}

impl OpenAiImageProvider {
    /// Creates a new `OpenAiImageProviderBuilder`.
    pub fn builder() -> OpenAiImageProviderBuilder {
        OpenAiImageProviderBuilder::new()
    }

    /// Builds the multipart body for an edit request.
    ///
    /// The user's photo goes first; the reference image, when present, is
    /// appended as a second `image` part.
    fn build_form(&self, request: &StyleRequest) -> Result<Form> {
        let upload = &request.upload;
        let image_part = Part::bytes(upload.data.clone())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(upload.media_type())
            .map_err(|e| CowifyError::InvalidRequest(e.to_string()))?;

        let mut form = Form::new()
            .text("model", self.model.as_str())
            .text(
                "size",
                request
                    .size
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SIZE.to_string()),
            )
            .text("prompt", request.prompt.clone())
            .part("image", image_part);

        if let Some(reference) = &request.reference {
            let reference_part = Part::bytes(reference.data.clone())
                .file_name(reference.file_name.clone())
                .mime_str(reference.mime_type())
                .map_err(|e| CowifyError::InvalidRequest(e.to_string()))?;
            form = form.part("image", reference_part);
        }

        Ok(form)
    }

    fn parse_error(status: u16, text: &str) -> CowifyError {
        let message = serde_json::from_str::<OpenAiErrorResponse>(text)
            .ok()
            .and_then(|body| body.error)
            .and_then(|error| error.message)
            .map(|message| sanitize_error_message(&message))
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| GENERIC_UPSTREAM_MESSAGE.to_string());

        CowifyError::Upstream { status, message }
    }
}

#[async_trait]
impl ImageEditor for OpenAiImageProvider {
    async fn edit(&self, request: &StyleRequest) -> Result<StylizedImage> {
        let start = Instant::now();
        let form = self.build_form(request)?;

        tracing::debug!(
            model = self.model.as_str(),
            upload_bytes = request.upload.size(),
            reference = request.reference.as_ref().map(|r| r.file_name.as_str()),
            "submitting OpenAI image edit"
        );

        let response = self
            .client
            .post(&self.edits_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &text));
        }

        let openai_response: OpenAiImageResponse = response.json().await?;

        let b64_json = openai_response
            .data
            .into_iter()
            .next()
            .and_then(|image| image.b64_json)
            .filter(|b64| !b64.is_empty())
            .ok_or(CowifyError::NoImageReturned)?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(duration_ms, "OpenAI image edit complete");

        Ok(StylizedImage::new(
            b64_json,
            GenerationMetadata {
                model: Some(self.model.as_str().to_string()),
                duration_ms: Some(duration_ms),
            },
        ))
    }

    fn name(&self) -> &str {
        "OpenAI (gpt-image)"
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiImageResponse {
    #[serde(default)]
    data: Vec<OpenAiImageData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageData {
    #[serde(default)]
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    #[serde(default)]
    error: Option<OpenAiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    #[serde(default)]
    message: Option<String>,
}
