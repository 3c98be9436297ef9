//! Image stylization module.

mod provider;
pub mod providers;
pub mod reference;
mod types;

pub use provider::ImageEditor;
pub use reference::{find_reference_image, load_reference_image, REFERENCE_CANDIDATES};
pub use types::{
    decode_data_url, GenerationMetadata, ImageFormat, ReferenceAsset, StyleRequest,
    StylizedImage, Upload, DEFAULT_MEDIA_TYPE,
};
