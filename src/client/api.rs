//! HTTP client for the relay endpoint.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::{CowifyError, Result, GENERIC_FAILURE_MESSAGE};
use crate::image::Upload;

const COWIFY_PATH: &str = "/api/cowify";

/// File name used when the upload carries none.
const FALLBACK_FILE_NAME: &str = "upload.png";

/// Sends an upload to the relay and returns the restyled image as a data URL.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Relays `upload`, returning the `data:` URL of the result.
    async fn cowify(&self, upload: &Upload) -> Result<String>;
}

/// [`RelayApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayClient {
    /// Creates a client for the relay running at `base_url`
    /// (e.g. `http://localhost:3000`).
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: impl AsRef<str>) -> Self {
        Self {
            client,
            endpoint: format!("{}{COWIFY_PATH}", base_url.as_ref().trim_end_matches('/')),
        }
    }

    /// The full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayApi for HttpRelayClient {
    async fn cowify(&self, upload: &Upload) -> Result<String> {
        let part = Part::bytes(upload.data.clone())
            .file_name(
                upload
                    .file_name
                    .clone()
                    .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string()),
            )
            .mime_str(upload.media_type())
            .map_err(|e| CowifyError::InvalidRequest(e.to_string()))?;
        let form = Form::new().part("image", part);

        tracing::debug!(endpoint = %self.endpoint, upload_bytes = upload.size(), "posting upload to relay");

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str::<RelayResponse>(&text).unwrap_or_default();

        if !status.is_success() {
            let message = body
                .error
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
            return Err(CowifyError::Relay {
                status: status.as_u16(),
                message,
            });
        }

        body.image
            .filter(|image| !image.is_empty())
            .ok_or_else(|| CowifyError::Relay {
                status: status.as_u16(),
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            })
    }
}

#[derive(Debug, Default, Deserialize)]
struct RelayResponse {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = HttpRelayClient::new("http://localhost:3000/");
        assert_eq!(client.endpoint(), "http://localhost:3000/api/cowify");
    }

    #[tokio::test]
    async fn test_success_returns_data_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cowify"))
            .and(body_string_contains("name=\"image\""))
            .and(body_string_contains("me.jpg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"image": "data:image/png;base64,AQID"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let upload = Upload::new(vec![1, 2, 3])
            .with_content_type("image/jpeg")
            .with_file_name("me.jpg");
        let image = HttpRelayClient::new(server.uri())
            .cowify(&upload)
            .await
            .unwrap();
        assert_eq!(image, "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn test_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({"error": "Invalid image file"})))
            .mount(&server)
            .await;

        let err = HttpRelayClient::new(server.uri())
            .cowify(&Upload::new(vec![1]))
            .await
            .unwrap_err();
        assert!(matches!(err, CowifyError::Relay { status: 502, .. }));
        assert_eq!(err.to_string(), "Invalid image file");
    }

    #[tokio::test]
    async fn test_error_without_message_is_generic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = HttpRelayClient::new(server.uri())
            .cowify(&Upload::new(vec![1]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
    }
}
