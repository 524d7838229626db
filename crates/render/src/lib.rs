//! Document rendering backend for the documentation site
//!
//! Takes the node trees producers build with `vdom` and turns them into
//! complete HTML pages, plus the list of assets still to be copied.
//!
//! # Pipeline
//!
//! 1. **Resolve**: await pending content anywhere in the tree
//! 2. **Extract**: pull head injections, body classes and assets out
//! 3. **Decide**: inline stylesheets and scripts, or link them
//! 4. **Compose**: one deterministic page per call
//!
//! A failed asset read fails the page. There is no partial output.

pub mod config;
pub mod document;
pub mod error;
pub mod loader;

pub use config::SerializerConfig;
pub use document::{stringify, Document, DocumentSerializer};
pub use error::{RenderError, Result};
pub use loader::{AssetLoader, CachedLoader, FsLoader};
