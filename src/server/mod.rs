//! HTTP relay server.
//!
//! Serves the static page and the `POST /api/cowify` relay, which forwards an
//! uploaded photo to the image-generation API and returns the result as a
//! data URL.

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use tokio::net::TcpListener;

pub use config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::{AppError, AppResult};
pub use router::build_app_router;
pub use state::AppState;

/// Starts the server and runs until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if the provider cannot be built or the port cannot be
/// bound.
pub async fn start(config: ServerConfig) -> crate::Result<()> {
    let addr = SocketAddr::new(config.host, config.port);
    let state = AppState::from_config(config)?;

    tracing::info!(
        static_dir = %state.config.static_dir.display(),
        reference_dir = %state.config.reference_dir.display(),
        max_upload_bytes = state.config.max_upload_bytes,
        configured = state.is_configured(),
        "server configuration loaded"
    );

    let app = build_app_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Cowify listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Wait for a SIGINT (Ctrl-C) or SIGTERM signal.
///
/// A handler that cannot be installed never fires; the other one still does.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
