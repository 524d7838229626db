//! Virtual document tree
//!
//! Producers build trees of nodes with the factories in [`builder`],
//! compose them with [`Element::add`], and drop side-channel directives
//! (head injections, assets, body classes) anywhere inside.
//!
//! ## Core Design
//!
//! ```text
//! builder::create → Element::add (resolved | pending) → Element::resolve
//!                                                            ↓
//!                           extract::extract_directives + serializer::to_html
//! ```
//!
//! Nothing here does I/O. Pending content is a future held in a slot;
//! whoever serializes the tree awaits it.

pub mod builder;
pub mod element;
pub mod error;
pub mod extract;
pub mod serializer;
pub mod types;
pub mod utils;

pub use builder::{
    asset, asset_from, body_classed, create, head, head_with_id, text_node, text_node_with,
    AssetSpec,
};
pub use element::{Added, Element, ElementRef};
pub use error::{DomError, Result};
pub use extract::{extract_directives, extract_types, Directives};
pub use types::*;
pub use utils::{escape_html, random_id, random_id_from};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_round_trip() {
        let mut root = create("div");
        root.set_class("a").add(text_node("<b>")).add(asset("/s.css", "s.css"));

        assert_eq!(root.stringify(), "<div class=\"a\">&lt;b&gt;</div>");
        assert_eq!(root.content().len(), 2);
    }
}
