pub mod cowify;
pub mod health;

use axum::Router;

use crate::server::state::AppState;

/// All API routes, mounted under `/api`.
///
/// ```text
/// POST /cowify    restyle an uploaded photo
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().merge(cowify::router(max_upload_bytes))
}
