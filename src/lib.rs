//! Cowify - turn a profile picture into a cartoon cow.
//!
//! The crate has three parts:
//!
//! - [`image`]: the image-edit seam ([`ImageEditor`]) with the OpenAI
//!   provider, the request/result types and the reference-image lookup.
//! - [`server`]: the axum relay exposing `POST /api/cowify` and the static
//!   page.
//! - [`client`]: the upload/run session driving the relay, plus the page's
//!   copy-to-clipboard and scroll-reveal affordances.
//!
//! # Quick Start - Relay
//!
//! ```no_run
//! use cowify::server::{self, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> cowify::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     server::start(config).await
//! }
//! ```
//!
//! # Quick Start - Client
//!
//! ```no_run
//! use cowify::client::{DirectorySink, HttpRelayClient, UploadSession};
//! use cowify::Upload;
//!
//! #[tokio::main]
//! async fn main() -> cowify::Result<()> {
//!     let api = HttpRelayClient::new("http://localhost:3000");
//!     let mut session: UploadSession = UploadSession::default();
//!     session.select_file(Some(Upload::from_path("me.jpg")?));
//!     if session.run(&api).await {
//!         session.download(&mut DirectorySink::new("."))?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `server`: the axum relay (default)
//! - `cli`: the `cowify` binary (default)

mod error;

pub mod client;
pub mod image;

#[cfg(feature = "server")]
pub mod server;

// Re-export error types at crate root
pub use error::{CowifyError, Result, GENERIC_FAILURE_MESSAGE};

pub use image::providers::{OpenAiImageModel, OpenAiImageProvider, OpenAiImageProviderBuilder};
pub use image::{
    GenerationMetadata, ImageEditor, ImageFormat, ReferenceAsset, StyleRequest, StylizedImage,
    Upload,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::{HttpRelayClient, RelayApi, UploadSession};
    pub use crate::error::{CowifyError, Result};
    pub use crate::image::providers::OpenAiImageProvider;
    pub use crate::image::{ImageEditor, StyleRequest, StylizedImage, Upload};

    #[cfg(feature = "server")]
    pub use crate::server::{build_app_router, AppState, ServerConfig};
}
