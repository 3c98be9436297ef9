//! Lookup of the local reference image attached to every restyle request.

use crate::error::Result;
use crate::image::types::ReferenceAsset;
use std::path::{Path, PathBuf};

/// File names checked for a reference image, in priority order.
pub const REFERENCE_CANDIDATES: [&str; 4] = [
    "cow-style.jpg",
    "cow-style.jpeg",
    "cow-style.png",
    "cow.jpg",
];

/// Returns the first candidate that exists as a file in `dir`.
pub fn find_reference_image(dir: impl AsRef<Path>) -> Option<PathBuf> {
    let dir = dir.as_ref();
    REFERENCE_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Loads the reference image from `dir`.
///
/// Returns `Ok(None)` when no candidate exists. A candidate that exists but
/// cannot be read is an error.
pub async fn load_reference_image(dir: impl AsRef<Path>) -> Result<Option<ReferenceAsset>> {
    let Some(path) = find_reference_image(dir) else {
        return Ok(None);
    };

    let data = tokio::fs::read(&path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    tracing::debug!(path = %path.display(), size = data.len(), "loaded reference image");

    Ok(Some(ReferenceAsset::new(data, file_name)))
}
