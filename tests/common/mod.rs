#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cowify::server::{build_app_router, AppState, ServerConfig};

pub const BOUNDARY: &str = "cowify-test-boundary";

/// A relay wired to a stubbed image API, with its own static and reference
/// directories.
pub struct TestApp {
    pub router: Router,
    pub upstream: MockServer,
    pub static_dir: TempDir,
    pub reference_dir: TempDir,
}

/// Build a test `ServerConfig` pointing at `upstream`.
pub fn test_config(upstream: &MockServer, static_dir: &TempDir, reference_dir: &TempDir) -> ServerConfig {
    ServerConfig {
        port: 0,
        openai_api_key: Some("sk-test".to_string()),
        openai_base_url: Some(format!("{}/v1", upstream.uri())),
        static_dir: static_dir.path().to_path_buf(),
        reference_dir: reference_dir.path().to_path_buf(),
        ..ServerConfig::default()
    }
}

/// Build the full application router for `config`, the same way the binary
/// does.
pub fn build_test_app(config: ServerConfig) -> Router {
    let state = AppState::from_config(config).unwrap();
    build_app_router(state)
}

/// Starts a stub upstream and a relay configured against it.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Like [`spawn_app`], letting the caller adjust the configuration.
pub async fn spawn_app_with(adjust: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let upstream = MockServer::start().await;
    let static_dir = tempfile::tempdir().unwrap();
    let reference_dir = tempfile::tempdir().unwrap();

    let mut config = test_config(&upstream, &static_dir, &reference_dir);
    adjust(&mut config);

    TestApp {
        router: build_test_app(config),
        upstream,
        static_dir,
        reference_dir,
    }
}

/// Stub a successful edit returning `b64`.
pub async fn mock_edit_success(server: &MockServer, b64: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/images/edits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1,
            "data": [{ "b64_json": b64 }]
        })))
        .mount(server)
        .await;
}

/// Stub that fails the test if the upstream is ever called.
pub async fn mock_never_called(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

/// One part of a hand-built multipart body.
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FormPart {
    /// An `image` file part.
    pub fn image(file_name: &str, content_type: Option<&str>, data: &[u8]) -> Self {
        Self {
            name: "image".to_string(),
            file_name: Some(file_name.to_string()),
            content_type: content_type.map(str::to_string),
            data: data.to_vec(),
        }
    }

    /// A plain text field.
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            file_name: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

/// Encodes `parts` as `multipart/form-data` using [`BOUNDARY`].
pub fn multipart_body(parts: &[FormPart]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = &part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = &part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST `parts` to `/api/cowify`.
pub async fn post_cowify(app: Router, parts: &[FormPart]) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/cowify")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
