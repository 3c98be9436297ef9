use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::{CowifyError, GENERIC_FAILURE_MESSAGE};

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{"error": "..."}` bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The external API credential is missing.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// The request carried no image.
    #[error("no image uploaded")]
    NoUploadProvided,

    /// The upload exceeded the configured limit.
    #[error("upload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The upload declared a media type outside the allow-list.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// A bad request with a human-readable message.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The image-generation API failed; the message is safe to relay.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Anything else. The message is logged, never returned.
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoUploadProvided | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::ConfigurationMissing(_) | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client.
    fn client_message(&self) -> String {
        match self {
            Self::ConfigurationMissing(_) => "Image service is not configured.".to_string(),
            Self::NoUploadProvided => "No image uploaded.".to_string(),
            Self::PayloadTooLarge { limit } => {
                format!("Image is too large (limit is {limit} bytes).")
            }
            Self::UnsupportedMediaType(mime) => {
                format!("Unsupported image type: {mime}. Use PNG, JPEG or WebP.")
            }
            Self::BadRequest(msg) | Self::Upstream(msg) => msg.clone(),
            Self::Unexpected(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = json!({ "error": self.client_message() });
        (status, axum::Json(body)).into_response()
    }
}

impl From<CowifyError> for AppError {
    fn from(err: CowifyError) -> Self {
        match err {
            CowifyError::ConfigurationMissing(msg) => Self::ConfigurationMissing(msg),
            CowifyError::NoUploadProvided => Self::NoUploadProvided,
            CowifyError::UploadTooLarge { limit } => Self::PayloadTooLarge { limit },
            CowifyError::UnsupportedMediaType(mime) => Self::UnsupportedMediaType(mime),
            CowifyError::InvalidRequest(msg) => Self::BadRequest(msg),
            CowifyError::Upstream { message, .. } => Self::Upstream(message),
            CowifyError::NoImageReturned => Self::Upstream("No image returned.".to_string()),
            other => Self::Unexpected(other.to_string()),
        }
    }
}
