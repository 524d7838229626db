//! Serializer configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How a document treats its assets
///
/// Field names follow the option names producers already pass around
/// (`embedAssets`, `assetPath`). Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SerializerConfig {
    /// Inline stylesheets and scripts instead of linking them
    pub embed_assets: bool,
    /// Prefix for linked asset urls
    pub asset_path: String,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            embed_assets: true,
            asset_path: String::new(),
        }
    }
}

impl SerializerConfig {
    /// Link every asset under `asset_path` instead of inlining
    pub fn linked(asset_path: impl Into<String>) -> Self {
        Self {
            embed_assets: false,
            asset_path: asset_path.into(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
