//! Error types for the cowify relay and client.

/// Longest upstream error message relayed to callers, in characters.
const MAX_ERROR_MESSAGE_CHARS: usize = 500;

/// Shown to users when a run fails without a more specific message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Cowify failed.";

/// Errors that can occur while relaying or requesting a stylized image.
#[derive(Debug, thiserror::Error)]
pub enum CowifyError {
    /// The external API credential is not configured.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// A configuration value is present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request did not carry an image upload.
    #[error("no image uploaded")]
    NoUploadProvided,

    /// The upload is larger than the configured limit.
    #[error("upload exceeds the {limit} byte limit")]
    UploadTooLarge { limit: usize },

    /// The upload declared a media type that is not accepted.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The image-generation API returned a non-success response.
    #[error("upstream error: {status} - {message}")]
    Upstream { status: u16, message: String },

    /// The image-generation API succeeded but returned no usable image.
    #[error("no image returned")]
    NoImageReturned,

    /// The relay endpoint rejected a client request.
    #[error("{message}")]
    Relay { status: u16, message: String },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., reading the reference asset).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to decode base64 or a data URI.
    #[error("failed to decode: {0}")]
    Decode(String),
}

impl CowifyError {
    /// Returns true if the external API is to blame for this error.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::NoImageReturned)
    }

    /// Returns true if the caller sent a request that can never succeed as-is.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NoUploadProvided
                | Self::UploadTooLarge { .. }
                | Self::UnsupportedMediaType(_)
                | Self::InvalidRequest(_)
        )
    }
}

/// Result type alias for cowify operations.
pub type Result<T> = std::result::Result<T, CowifyError>;

/// Cleans an upstream error message before it is relayed to untrusted callers.
///
/// Trims surrounding whitespace, redacts anything that looks like an API key (`sk-...`)
/// and truncates overly long messages. Line breaks inside the message are kept.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut redacted = String::with_capacity(text.len());
    for piece in text.trim().split_inclusive(char::is_whitespace) {
        let word = piece.trim_end_matches(char::is_whitespace);
        let key = word.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-');
        if key.starts_with("sk-") && key.len() > 8 {
            redacted.push_str(&word.replace(key, "sk-***"));
        } else {
            redacted.push_str(word);
        }
        redacted.push_str(&piece[word.len()..]);
    }

    if redacted.chars().count() > MAX_ERROR_MESSAGE_CHARS {
        let truncated: String = redacted.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
        format!("{truncated}...")
    } else {
        redacted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_upstream() {
        assert!(CowifyError::NoImageReturned.is_upstream());
        assert!(CowifyError::Upstream {
            status: 400,
            message: "bad".into()
        }
        .is_upstream());

        assert!(!CowifyError::NoUploadProvided.is_upstream());
        assert!(!CowifyError::ConfigurationMissing("OPENAI_API_KEY".into()).is_upstream());
    }

    #[test]
    fn test_is_client_error() {
        assert!(CowifyError::NoUploadProvided.is_client_error());
        assert!(CowifyError::UploadTooLarge { limit: 10 }.is_client_error());
        assert!(CowifyError::UnsupportedMediaType("text/plain".into()).is_client_error());
        assert!(!CowifyError::NoImageReturned.is_client_error());
    }

    #[test]
    fn test_error_display() {
        let err = CowifyError::Upstream {
            status: 400,
            message: "Invalid image".into(),
        };
        assert_eq!(err.to_string(), "upstream error: 400 - Invalid image");

        let err = CowifyError::Relay {
            status: 502,
            message: "No image returned.".into(),
        };
        assert_eq!(err.to_string(), "No image returned.");
    }

    #[test]
    fn test_sanitize_redacts_api_keys() {
        let msg = sanitize_error_message("Incorrect API key provided: sk-abc123456789xyz.");
        assert_eq!(msg, "Incorrect API key provided: sk-***.");
    }

    #[test]
    fn test_sanitize_trims_and_truncates() {
        assert_eq!(sanitize_error_message("  spaced   out \n"), "spaced   out");

        let long = "x".repeat(MAX_ERROR_MESSAGE_CHARS + 50);
        let msg = sanitize_error_message(&long);
        assert_eq!(msg.chars().count(), MAX_ERROR_MESSAGE_CHARS + 3);
        assert!(msg.ends_with("..."));
    }

    #[test]
    fn test_sanitize_keeps_line_breaks() {
        let msg = sanitize_error_message("Invalid request.\nKey sk-abc123456789xyz was rejected.\n");
        assert_eq!(msg, "Invalid request.\nKey sk-*** was rejected.");
    }

    #[test]
    fn test_sanitize_keeps_short_sk_words() {
        assert_eq!(sanitize_error_message("ask-me"), "ask-me");
        assert_eq!(sanitize_error_message("sk-1"), "sk-1");
    }
}
