use std::sync::Arc;

use crate::error::Result;
use crate::image::providers::OpenAiImageProvider;
use crate::image::ImageEditor;
use crate::server::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Immutable and cheaply cloneable, so concurrent requests share it without
/// locking.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Image editor used by the relay. `None` when no credential is configured.
    pub editor: Option<Arc<dyn ImageEditor>>,
}

impl AppState {
    /// Creates state with an explicit editor.
    pub fn new(config: ServerConfig, editor: Option<Arc<dyn ImageEditor>>) -> Self {
        Self {
            config: Arc::new(config),
            editor,
        }
    }

    /// Creates state from configuration, building the OpenAI provider when a
    /// credential is present.
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let editor = match &config.openai_api_key {
            Some(key) => {
                let mut builder = OpenAiImageProvider::builder().api_key(key.clone());
                if let Some(url) = &config.openai_base_url {
                    builder = builder.base_url(url.clone());
                }
                Some(Arc::new(builder.build()?) as Arc<dyn ImageEditor>)
            }
            None => {
                tracing::warn!("OPENAI_API_KEY is not set; /api/cowify will report a configuration error");
                None
            }
        };

        Ok(Self::new(config, editor))
    }

    /// Returns true if the relay can reach the image-generation API.
    pub fn is_configured(&self) -> bool {
        self.editor.is_some()
    }
}
