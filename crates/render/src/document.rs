//! Document Serializer - turn a node tree into a full HTML page
//!
//! This module handles:
//! - Awaiting pending content anywhere in the tree
//! - Collecting head injections, body classes and assets
//! - Deciding per asset whether to inline it or link it
//! - Composing the final page
//!
//! Output depends only on tree structure. Asset reads run concurrently
//! and finish in any order; results are placed by position, not arrival.
//! One failed read fails the whole document.

use ahash::{AHashMap, AHashSet};
use futures_util::future::{self, try_join_all, BoxFuture};
use futures_util::FutureExt;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use vdom::{extract_directives, serializer, Asset, AssetKind, Child, Element, HeadInject, PageModifier, Slot};

use crate::config::SerializerConfig;
use crate::error::{RenderError, Result};
use crate::loader::{AssetLoader, FsLoader};

/// A serialized page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub html: String,
    /// Assets that were not inlined and still need copying to the output
    pub assets: Vec<Asset>,
}

/// A page with everything but asset contents rendered
struct Page {
    head: String,
    body_class: String,
    body: String,
    /// Unique by url, in first-occurrence order
    assets: Vec<Asset>,
}

/// Renders node trees to documents
pub struct DocumentSerializer {
    config: SerializerConfig,
    loader: Arc<dyn AssetLoader>,
}

impl DocumentSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self {
            config,
            loader: Arc::new(FsLoader::new()),
        }
    }

    /// Replace the loader used for embedded assets
    pub fn with_loader(mut self, loader: Arc<dyn AssetLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Serialize root nodes, resolving any pending content first
    ///
    /// Roots may be anything `Element::add` accepts, pending futures included.
    pub async fn stringify<I, C>(&self, roots: I) -> Result<Document>
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        // Transient owner for the roots, never rendered itself
        let mut holder = Element::new("");
        for root in roots {
            holder.add(root);
        }
        holder.resolve().await;

        let page = self.prepare(holder.content());
        self.finish(page).await
    }

    /// Serialize a tree that has no pending content left
    ///
    /// Pending slots that remain render as nothing.
    pub fn stringify_resolved<'a>(
        &'a self,
        roots: &[Slot],
    ) -> impl Future<Output = Result<Document>> + Send + 'a {
        let page = self.prepare(roots);
        self.finish(page)
    }

    /// Everything that needs no I/O; the tree is not borrowed past this
    fn prepare(&self, roots: &[Slot]) -> Page {
        let directives = extract_directives(roots);
        tracing::debug!(
            "Serializing document: {} head injections, {} modifiers, {} asset references",
            directives.heads.len(),
            directives.modifiers.len(),
            directives.assets.len()
        );

        Page {
            head: render_head(&directives.heads),
            body_class: body_class(&directives.modifiers),
            body: serializer::to_html(roots),
            assets: unique_assets(&directives.assets),
        }
    }

    async fn finish(&self, page: Page) -> Result<Document> {
        let mut exported: Vec<Asset> = Vec::new();

        let stylesheets = self.asset_tags(&page.assets, AssetKind::Stylesheet, &mut exported);
        let scripts = self.asset_tags(&page.assets, AssetKind::Script, &mut exported);

        // Everything else is never inlined
        exported.extend(
            page.assets
                .iter()
                .filter(|a| a.kind() == AssetKind::Other)
                .cloned(),
        );

        let (stylesheets, scripts) =
            future::try_join(try_join_all(stylesheets), try_join_all(scripts)).await?;

        let mut html = String::with_capacity(page.body.len() + page.head.len() + 256);
        html.push_str("<!DOCTYPE html><html><head>");
        html.push_str(&page.head);
        stylesheets.iter().for_each(|s| html.push_str(s));
        html.push_str("</head>");
        if page.body_class.is_empty() {
            html.push_str("<body>");
        } else {
            html.push_str("<body class=\"");
            html.push_str(&page.body_class);
            html.push_str("\">");
        }
        html.push_str(&page.body);
        scripts.iter().for_each(|s| html.push_str(s));
        html.push_str("</body></html>");

        Ok(Document {
            html,
            assets: exported,
        })
    }

    /// One future per asset of `kind`, yielding its tag
    ///
    /// Linked assets are recorded in `exported` as the futures are built,
    /// which keeps the export order stable.
    fn asset_tags<'a>(
        &'a self,
        assets: &'a [Asset],
        kind: AssetKind,
        exported: &mut Vec<Asset>,
    ) -> Vec<BoxFuture<'a, Result<String>>> {
        assets
            .iter()
            .filter(|a| a.kind() == kind)
            .map(|asset| {
                if self.config.embed_assets {
                    tracing::trace!("Embedding asset {} via {}", asset.url, self.loader.name());
                    let loader = Arc::clone(&self.loader);
                    async move {
                        let content = loader.load(asset).await?;
                        let tag = match kind {
                            AssetKind::Stylesheet => format!("<style>{}</style>", content),
                            _ => format!("<script>{}</script>", content),
                        };
                        Ok::<_, RenderError>(tag)
                    }
                    .boxed()
                } else {
                    tracing::trace!("Linking asset {}", asset.url);
                    exported.push(asset.clone());
                    let url = format!("{}{}", self.config.asset_path, asset.url);
                    let tag = match kind {
                        AssetKind::Stylesheet => {
                            format!("<link rel=\"stylesheet\" href=\"{}\"></link>", url)
                        }
                        _ => format!("<script src=\"{}\"></script>", url),
                    };
                    future::ready(Ok(tag)).boxed()
                }
            })
            .collect()
    }
}

impl Default for DocumentSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize with the filesystem loader
pub async fn stringify<I, C>(roots: I, config: SerializerConfig) -> Result<Document>
where
    I: IntoIterator<Item = C>,
    C: Into<Child>,
{
    DocumentSerializer::with_config(config).stringify(roots).await
}

/// Last injection per id wins; injections without an id are all kept.
/// Survivors keep their original relative order.
fn render_head(heads: &[&HeadInject]) -> String {
    let mut latest: AHashMap<&str, usize> = AHashMap::new();
    for (i, head) in heads.iter().enumerate() {
        if let Some(id) = dedup_key(head) {
            latest.insert(id, i);
        }
    }

    let mut output = String::new();
    for (i, head) in heads.iter().enumerate() {
        let keep = match dedup_key(head) {
            Some(id) => latest.get(id) == Some(&i),
            None => true,
        };
        if keep {
            head.element.write_html(&mut output);
        }
    }
    output
}

/// An empty id counts as no id
fn dedup_key<'a>(head: &'a HeadInject) -> Option<&'a str> {
    head.id.as_deref().filter(|id| !id.is_empty())
}

/// Last toggle per class wins; enabled classes in first-seen order
fn body_class(modifiers: &[&PageModifier]) -> String {
    let mut order: Vec<(&str, bool)> = Vec::new();
    let mut index: AHashMap<&str, usize> = AHashMap::new();

    for modifier in modifiers {
        match modifier {
            PageModifier::BodyClassed { class, enabled } => match index.get(class.as_str()) {
                Some(&i) => order[i].1 = *enabled,
                None => {
                    index.insert(class.as_str(), order.len());
                    order.push((class.as_str(), *enabled));
                }
            },
            _ => {}
        }
    }

    order
        .into_iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(class, _)| class)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First occurrence per url wins
fn unique_assets(assets: &[&Asset]) -> Vec<Asset> {
    let mut seen: AHashSet<&str> = AHashSet::new();
    assets
        .iter()
        .filter(|a| seen.insert(a.url.as_str()))
        .map(|a| (*a).clone())
        .collect()
}
