//! Asset loaders
//!
//! The serializer reads stylesheet and script sources through this seam,
//! so a build can swap in a cache or an in-memory source.
//!
//! Loaders never retry. A failed read surfaces as-is and the caller
//! decides what to do.

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vdom::Asset;

use crate::error::{RenderError, Result};

/// Reads the contents of an asset's source file
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    /// Load the asset source as text
    async fn load(&self, asset: &Asset) -> Result<String>;
}

/// Reads asset sources from disk with `tokio::fs`
///
/// Relative paths resolve against `base_dir` when one is set, otherwise
/// against the working directory. Invalid UTF-8 is replaced, not rejected.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    base_dir: Option<PathBuf>,
}

impl FsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn path_for(&self, file: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(file),
            None => file.to_path_buf(),
        }
    }
}

#[async_trait]
impl AssetLoader for FsLoader {
    fn name(&self) -> &str {
        "fs"
    }

    async fn load(&self, asset: &Asset) -> Result<String> {
        let path = self.path_for(asset.file());

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(source) => {
                tracing::warn!("Failed to read asset {} ({}): {}", asset.url, path.display(), source);
                Err(RenderError::AssetRead { path, source })
            }
        }
    }
}

/// Memoizes another loader by source path
///
/// Lives as long as the build process keeps it; nothing is persisted.
/// Failed reads are not cached, so a fixed file is picked up next time.
pub struct CachedLoader<L> {
    inner: L,
    cache: DashMap<PathBuf, Arc<str>>,
}

impl<L: AssetLoader> CachedLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Number of cached sources
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drop a cached source, e.g. after the file changed
    pub fn invalidate(&self, file: &Path) -> bool {
        self.cache.remove(file).is_some()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

#[async_trait]
impl<L: AssetLoader> AssetLoader for CachedLoader<L> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn load(&self, asset: &Asset) -> Result<String> {
        if let Some(hit) = self.cache.get(asset.file()) {
            tracing::trace!("Asset cache hit: {}", asset.file().display());
            return Ok(hit.to_string());
        }

        let content = self.inner.load(asset).await?;
        self.cache
            .insert(asset.file().to_path_buf(), Arc::from(content.as_str()));
        Ok(content)
    }
}
