//! Error types for document serialization
//!
//! Every variant is fatal for the document being serialized.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to read asset {}: {source}", .path.display())]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid serializer config: {0}")]
    Config(#[from] serde_json::Error),
}
