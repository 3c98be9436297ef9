//! Integration tests for the health check, static files and general HTTP
//! behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, body_text, get, spawn_app, spawn_app_with};

#[tokio::test]
async fn health_reports_configured() {
    let app = spawn_app().await;
    let response = get(app.router.clone(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["configured"], true);
}

#[tokio::test]
async fn health_reports_missing_credential() {
    let app = spawn_app_with(|config| config.openai_api_key = None).await;
    let json = body_json(get(app.router.clone(), "/health").await).await;

    assert_eq!(json["status"], "ok");
    assert_eq!(json["configured"], false);
}

#[tokio::test]
async fn serves_index_from_static_dir() {
    let app = spawn_app().await;
    std::fs::write(
        app.static_dir.path().join("index.html"),
        "<h1>Cowify your PFP</h1>",
    )
    .unwrap();
    std::fs::write(app.static_dir.path().join("script.js"), "console.log('moo');").unwrap();

    let response = get(app.router.clone(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Cowify your PFP"));

    let response = get(app.router.clone(), "/script.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "console.log('moo');");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = spawn_app().await;
    let response = get(app.router.clone(), "/does-not-exist.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_request_id() {
    let app = spawn_app().await;
    let response = get(app.router.clone(), "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header")
        .to_str()
        .unwrap();
    // UUID v4 with hyphens.
    assert_eq!(request_id.len(), 36);
}
