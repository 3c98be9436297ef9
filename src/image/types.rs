//! Core types for image stylization.

use crate::error::{CowifyError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Media type assumed for uploads that do not declare one.
pub const DEFAULT_MEDIA_TYPE: &str = "image/png";

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Parses a declared media type, ignoring parameters and case.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// A user's photo as received from the browser or CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Media type declared by the sender, if any.
    pub content_type: Option<String>,
    /// Original file name, if any.
    pub file_name: Option<String>,
}

impl Upload {
    /// Creates an upload without a declared media type.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            content_type: None,
            file_name: None,
        }
    }

    /// Sets the declared media type. Blank values count as undeclared.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        self.content_type = (!content_type.trim().is_empty()).then_some(content_type);
        self
    }

    /// Sets the original file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Reads an upload from disk, declaring a media type from the extension
    /// or, failing that, the file's magic bytes.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .or_else(|| ImageFormat::from_magic_bytes(&data));
        let mut upload = Self::new(data);

        if let Some(format) = format {
            upload = upload.with_content_type(format.mime_type());
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            upload = upload.with_file_name(name);
        }

        Ok(upload)
    }

    /// The media type sent upstream: the declared one, or [`DEFAULT_MEDIA_TYPE`].
    pub fn media_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_MEDIA_TYPE)
    }

    /// Returns the size of the upload in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the upload carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A fixed server-local image attached to bias the output style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceAsset {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// File name the asset was found under.
    pub file_name: String,
    /// Media type inferred from the file extension.
    pub format: ImageFormat,
}

impl ReferenceAsset {
    /// Creates a reference asset, inferring its media type from `file_name`.
    pub fn new(data: Vec<u8>, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let format = reference_format(&file_name);
        Self {
            data,
            file_name,
            format,
        }
    }

    /// Returns the MIME type sent upstream for this asset.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// `.png` is PNG, `.jpg`/`.jpeg` are JPEG, anything else falls back to PNG.
fn reference_format(file_name: &str) -> ImageFormat {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => ImageFormat::Jpeg,
        _ => ImageFormat::Png,
    }
}

/// A request to restyle an uploaded photo.
#[derive(Debug, Clone)]
pub struct StyleRequest {
    /// The text prompt describing the desired style.
    pub prompt: String,
    /// Output size, e.g. `1024x1024`. Providers pick a default when unset.
    pub size: Option<String>,
    /// The user's photo.
    pub upload: Upload,
    /// Optional reference image biasing the style.
    pub reference: Option<ReferenceAsset>,
}

impl StyleRequest {
    /// Creates a new request for the given prompt and upload.
    pub fn new(prompt: impl Into<String>, upload: Upload) -> Self {
        Self {
            prompt: prompt.into(),
            size: None,
            upload,
            reference: None,
        }
    }

    /// Sets the output size.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Attaches a reference image, if one was found.
    pub fn with_reference(mut self, reference: Option<ReferenceAsset>) -> Self {
        self.reference = reference;
        self
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A stylized image as returned by the image-generation API.
#[derive(Debug, Clone)]
#[must_use = "stylized image should be relayed or saved"]
pub struct StylizedImage {
    /// Base64 payload exactly as returned upstream.
    pub b64_json: String,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl StylizedImage {
    /// Creates a new stylized image from a base64 payload.
    pub fn new(b64_json: impl Into<String>, metadata: GenerationMetadata) -> Self {
        Self {
            b64_json: b64_json.into(),
            metadata,
        }
    }

    /// Returns the image as a PNG data URL, without re-encoding the payload.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.b64_json)
    }

    /// Decodes the base64 payload into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode_base64(&self.b64_json)
    }
}

/// Splits a `data:<mime>;base64,<payload>` URL into its media type and bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| CowifyError::Decode("not a data URL".into()))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| CowifyError::Decode("data URL is not base64 encoded".into()))?;

    Ok((mime.to_string(), decode_base64(payload)?))
}

/// Decodes base64, tolerating embedded whitespace and missing padding.
fn decode_base64(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    if let Ok(data) = base64::engine::general_purpose::STANDARD.decode(&cleaned) {
        return Ok(data);
    }

    base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(cleaned.trim_end_matches('='))
        .map_err(|e| CowifyError::Decode(e.to_string()))
}
