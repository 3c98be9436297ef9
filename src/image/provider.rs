//! Image editor trait.

use crate::error::Result;
use crate::image::types::{StyleRequest, StylizedImage};
use async_trait::async_trait;

/// Trait for services that restyle an uploaded image.
///
/// The relay endpoint only talks to this seam, so tests can swap the real
/// provider for a stub.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Restyles the upload in `request`, returning the generated image.
    async fn edit(&self, request: &StyleRequest) -> Result<StylizedImage>;

    /// Returns the name of this editor for display.
    fn name(&self) -> &str;
}
