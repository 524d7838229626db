//! Core node definitions for the virtual document tree
//!
//! Key design principles:
//! 1. Closed enum over node kinds, no runtime type probing
//! 2. Ownership flows from container to children, never back
//! 3. Not-yet-resolved content is a slot state, not a node kind
//! 4. Directive nodes (head, asset, modifier) carry no children

use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::element::Element;
use crate::utils::escape_html;

/// Element identity
///
/// Only used for `remove_child` and the parent back-reference.
/// Nothing keeps a table of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node kind, used to select what the extractor pulls out of a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeKind {
    Element = 1,
    Text = 2,
    Asset = 3,
    Head = 4,
    Modifier = 5,
}

/// A finished node in the tree
#[derive(Debug)]
pub enum Node {
    Element(Element),
    Text(TextNode),
    Asset(Asset),
    Head(HeadInject),
    Modifier(PageModifier),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Element(_) => NodeKind::Element,
            Node::Text(_) => NodeKind::Text,
            Node::Asset(_) => NodeKind::Asset,
            Node::Head(_) => NodeKind::Head,
            Node::Modifier(_) => NodeKind::Modifier,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// Text content, stored exactly as it will be written out
///
/// Whether it was escaped is decided once, at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNode {
    text: String,
}

impl TextNode {
    /// Escape `text` for HTML
    pub fn escaped(text: &str) -> Self {
        Self {
            text: escape_html(text).into_owned(),
        }
    }

    /// Keep `text` as-is (caller promises it is valid markup)
    pub fn raw(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// How the serializer treats an asset, decided by url suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    Stylesheet,
    Script,
    Other,
}

/// Reference to an external file the page depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Logical output path
    pub url: String,
    /// Source file to read when embedding
    pub file: PathBuf,
    /// Informational only, does not affect deduplication
    pub shared: bool,
}

impl Asset {
    pub fn new(url: impl Into<String>, file: impl Into<PathBuf>, shared: bool) -> Self {
        Self {
            url: url.into(),
            file: file.into(),
            shared,
        }
    }

    pub fn kind(&self) -> AssetKind {
        if self.url.ends_with(".css") {
            AssetKind::Stylesheet
        } else if self.url.ends_with(".js") {
            AssetKind::Script
        } else {
            AssetKind::Other
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Request to place an element inside the document head
///
/// Wrappers sharing an `id` replace each other (last one wins).
/// Wrappers without an `id` are always kept.
#[derive(Debug)]
pub struct HeadInject {
    pub element: Element,
    pub id: Option<String>,
}

/// Directive applied while composing the final page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
#[non_exhaustive]
pub enum PageModifier {
    BodyClassed { class: String, enabled: bool },
}

/// Where `add` puts a child
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Route into the end slot (rendered after the main content)
    pub to_end: bool,
}

impl AddOptions {
    pub fn to_end() -> Self {
        Self { to_end: true }
    }
}

/// Options for `Element::text` and `builder::text_node_with`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    pub escape: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self { escape: true }
    }
}

/// Anything `Element::add` accepts
///
/// Resolved values go straight into the tree. `Pending` holds a future
/// that yields another `Child` once it completes.
pub enum Child {
    /// Adding nothing is a no-op
    Empty,
    Node(Node),
    /// Plain string, inserted without escaping
    Raw(String),
    Pending(BoxFuture<'static, Child>),
    Many(Vec<Child>),
}

impl Child {
    /// Wrap a future whose output can be added once it resolves
    pub fn pending<F, T>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: Into<Child>,
    {
        Child::Pending(future.map(|value| -> Child { value.into() }).boxed())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Child::Pending(_))
    }

    /// True when adding this child must wait for something first.
    /// Only direct items of a sequence count; nested sequences are
    /// handled on their own when the outer one is spread.
    pub(crate) fn is_deferred(&self) -> bool {
        match self {
            Child::Pending(_) => true,
            Child::Many(items) => items.iter().any(Child::is_pending),
            _ => false,
        }
    }

    pub(crate) fn into_future(self) -> BoxFuture<'static, Child> {
        match self {
            Child::Pending(fut) => fut,
            ready => future::ready(ready).boxed(),
        }
    }
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Empty => f.write_str("Empty"),
            Child::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Child::Raw(text) => f.debug_tuple("Raw").field(text).finish(),
            Child::Pending(_) => f.write_str("Pending(..)"),
            Child::Many(items) => f.debug_tuple("Many").field(items).finish(),
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<Element> for Child {
    fn from(el: Element) -> Self {
        Child::Node(Node::Element(el))
    }
}

impl From<TextNode> for Child {
    fn from(text: TextNode) -> Self {
        Child::Node(Node::Text(text))
    }
}

impl From<Asset> for Child {
    fn from(asset: Asset) -> Self {
        Child::Node(Node::Asset(asset))
    }
}

impl From<HeadInject> for Child {
    fn from(head: HeadInject) -> Self {
        Child::Node(Node::Head(head))
    }
}

impl From<PageModifier> for Child {
    fn from(modifier: PageModifier) -> Self {
        Child::Node(Node::Modifier(modifier))
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Raw(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Raw(text)
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Child::Empty, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(items: Vec<T>) -> Self {
        Child::Many(items.into_iter().map(Into::into).collect())
    }
}

/// A child addition queued on a pending slot
#[derive(Debug)]
pub(crate) struct Addition {
    pub child: Child,
    pub options: AddOptions,
}

/// Content that is not available yet
///
/// Additions chained onto it run, in call order, after it resolves.
pub struct Pending {
    pub(crate) future: BoxFuture<'static, Child>,
    pub(crate) chained: Vec<Addition>,
}

impl Pending {
    pub(crate) fn new(future: BoxFuture<'static, Child>) -> Self {
        Self {
            future,
            chained: Vec::new(),
        }
    }

    /// Number of additions waiting on this slot
    pub fn chained_len(&self) -> usize {
        self.chained.len()
    }
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("chained", &self.chained.len())
            .finish_non_exhaustive()
    }
}

/// One entry in an element's child list
#[derive(Debug)]
pub enum Slot {
    Node(Node),
    Pending(Pending),
}

impl Slot {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Slot::Node(node) => Some(node),
            Slot::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending(_))
    }
}
