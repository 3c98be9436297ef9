//! Relay endpoint: restyle an uploaded photo as a cartoon cow.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::image::{load_reference_image, ImageFormat, StyleRequest, Upload};
use crate::server::error::{AppError, AppResult};
use crate::server::state::AppState;

/// Style prompt sent with every edit.
pub const COW_PROMPT: &str = "Transform the subject into a cute cartoon cow version. \
Keep the pose and framing similar, add cow spots, small horns, and a friendly snout. \
Match the linework, palette, and facial style of the reference cow image. \
Clean, lighthearted, professional cartoon style.";

/// Output size requested from the image-generation API.
pub const OUTPUT_SIZE: &str = "1024x1024";

/// Multipart field carrying the user's photo.
pub const UPLOAD_FIELD: &str = "image";

/// Room for boundaries, part headers and small text fields on top of the
/// upload itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Successful relay response.
#[derive(Debug, Serialize, Deserialize)]
pub struct CowifyResponse {
    /// `data:image/png;base64,...` URI of the restyled image.
    pub image: String,
}

/// POST /api/cowify
async fn cowify(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<CowifyResponse>> {
    // Checked before the body is touched so a misconfigured server never
    // reads uploads.
    let Some(editor) = state.editor.clone() else {
        return Err(AppError::ConfigurationMissing(
            "OPENAI_API_KEY is not set".into(),
        ));
    };

    // Not multipart at all: there is no file to find.
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "request is not multipart");
        AppError::NoUploadProvided
    })?;

    let limit = state.config.max_upload_bytes;
    let upload = read_upload(multipart, limit)
        .await?
        .filter(|upload| !upload.is_empty())
        .ok_or(AppError::NoUploadProvided)?;
    let upload = check_media_type(upload)?;

    let reference = load_reference_image(&state.config.reference_dir).await?;

    tracing::debug!(
        upload_bytes = upload.size(),
        media_type = upload.media_type(),
        reference = reference.as_ref().map(|r| r.file_name.as_str()),
        provider = editor.name(),
        "relaying cowify request"
    );

    let request = StyleRequest::new(COW_PROMPT, upload)
        .with_size(OUTPUT_SIZE)
        .with_reference(reference);
    let image = editor.edit(&request).await?;

    tracing::info!(
        duration_ms = image.metadata.duration_ms,
        model = image.metadata.model.as_deref(),
        "cowify complete"
    );

    Ok(Json(CowifyResponse {
        image: image.to_data_url(),
    }))
}

/// Reads the first `image` file field, enforcing `limit` while streaming.
///
/// Other fields are skipped. A second `image` file is rejected.
async fn read_upload(mut multipart: Multipart, limit: usize) -> AppResult<Option<Upload>> {
    let mut upload: Option<Upload> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if upload.is_some() {
            return Err(AppError::BadRequest(
                "Only one image may be uploaded.".into(),
            ));
        }
        let content_type = field.content_type().map(str::to_string);

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
            if data.len() + chunk.len() > limit {
                return Err(AppError::PayloadTooLarge { limit });
            }
            data.extend_from_slice(&chunk);
        }

        let mut received = Upload::new(data).with_file_name(file_name);
        if let Some(content_type) = content_type {
            received = received.with_content_type(content_type);
        }
        upload = Some(received);
    }

    Ok(upload)
}

fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Accepts PNG, JPEG and WebP. An undeclared or `application/octet-stream`
/// type is left undeclared so the upload goes out as PNG.
fn check_media_type(upload: Upload) -> AppResult<Upload> {
    let Some(declared) = upload.content_type.clone() else {
        return Ok(upload);
    };

    let essence = declared.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case("application/octet-stream") {
        return Ok(Upload {
            content_type: None,
            ..upload
        });
    }

    match ImageFormat::from_mime_type(&declared) {
        Some(format) => Ok(upload.with_content_type(format.mime_type())),
        None => Err(AppError::UnsupportedMediaType(essence.to_string())),
    }
}

/// Mount the relay route with a body limit sized for one upload.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/cowify",
        post(cowify).layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undeclared_type_passes_through() {
        let upload = check_media_type(Upload::new(vec![1])).unwrap();
        assert!(upload.content_type.is_none());
        assert_eq!(upload.media_type(), "image/png");
    }

    #[test]
    fn test_octet_stream_counts_as_undeclared() {
        let upload =
            check_media_type(Upload::new(vec![1]).with_content_type("application/octet-stream"))
                .unwrap();
        assert!(upload.content_type.is_none());
    }

    #[test]
    fn test_allowed_types_are_normalized() {
        let upload = check_media_type(Upload::new(vec![1]).with_content_type("image/JPG")).unwrap();
        assert_eq!(upload.media_type(), "image/jpeg");

        let upload = check_media_type(Upload::new(vec![1]).with_content_type("image/webp")).unwrap();
        assert_eq!(upload.media_type(), "image/webp");
    }

    #[test]
    fn test_other_types_are_rejected() {
        for mime in ["text/plain", "image/gif", "application/pdf; q=1"] {
            let result = check_media_type(Upload::new(vec![1]).with_content_type(mime));
            assert!(
                matches!(result, Err(AppError::UnsupportedMediaType(_))),
                "{mime} should be rejected"
            );
        }
    }

    #[test]
    fn test_prompt_mentions_reference() {
        assert!(COW_PROMPT.contains("reference cow image"));
        assert!(!COW_PROMPT.contains("  "));
    }
}
