//! Tree builder factories
//!
//! Stateless constructors for every node kind. Producers only ever
//! create nodes through these, then compose them with `Element::add`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::element::Element;
use crate::types::{Asset, HeadInject, PageModifier, TextNode, TextOptions};

/// Create an element of the given type
pub fn create(tag: impl Into<String>) -> Element {
    Element::new(tag)
}

/// Create an HTML-escaped text node
pub fn text_node(text: &str) -> TextNode {
    TextNode::escaped(text)
}

pub fn text_node_with(text: &str, options: TextOptions) -> TextNode {
    if options.escape {
        TextNode::escaped(text)
    } else {
        TextNode::raw(text)
    }
}

/// Toggle a class on the page body
///
/// The last toggle recorded for a class name wins.
pub fn body_classed(class: impl Into<String>, enabled: bool) -> PageModifier {
    PageModifier::BodyClassed {
        class: class.into(),
        enabled,
    }
}

/// Inject an element into the page head
pub fn head(element: Element) -> HeadInject {
    HeadInject { element, id: None }
}

/// Inject an element into the page head, replacing earlier injections
/// with the same id
pub fn head_with_id(element: Element, id: impl Into<String>) -> HeadInject {
    HeadInject {
        element,
        id: Some(id.into()),
    }
}

/// Reference an asset; whether it gets inlined is decided at stringify time
pub fn asset(url: impl Into<String>, file: impl Into<PathBuf>) -> Asset {
    Asset::new(url, file, false)
}

/// Asset description as it appears in producer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSpec {
    pub url: String,
    pub file: PathBuf,
    pub shared: bool,
}

impl From<AssetSpec> for Asset {
    fn from(spec: AssetSpec) -> Self {
        Asset::new(spec.url, spec.file, spec.shared)
    }
}

pub fn asset_from(spec: AssetSpec) -> Asset {
    spec.into()
}
