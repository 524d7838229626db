//! Directive extraction
//!
//! Producers drop head injections, assets and page modifiers anywhere in
//! the tree. This walks the whole thing and pulls them out.
//!
//! Depth-first pre-order, `content` before `end_content`. Iterative, no
//! recursion. Matched nodes are not descended into, and neither are head
//! wrappers.

use crate::types::{Asset, HeadInject, Node, NodeKind, PageModifier, Slot};

/// Collect every node of the requested kinds, one list per kind
///
/// `result[i]` holds the matches for `kinds[i]`, in encounter order.
/// Pending slots are skipped; resolve the tree first.
pub fn extract_types<'a>(roots: &'a [Slot], kinds: &[NodeKind]) -> Vec<Vec<&'a Node>> {
    let mut result: Vec<Vec<&Node>> = kinds.iter().map(|_| Vec::new()).collect();
    let mut stack: Vec<&Slot> = roots.iter().rev().collect();

    while let Some(slot) = stack.pop() {
        let Some(node) = slot.as_node() else {
            continue;
        };

        if let Some(index) = kinds.iter().position(|k| *k == node.kind()) {
            result[index].push(node);
        } else if let Node::Element(el) = node {
            // Reverse so children pop left-to-right, content first
            stack.extend(el.end_content().iter().rev());
            stack.extend(el.content().iter().rev());
        }
    }

    result
}

/// The side-channel nodes the serializer cares about
#[derive(Debug, Default)]
pub struct Directives<'a> {
    pub heads: Vec<&'a HeadInject>,
    pub modifiers: Vec<&'a PageModifier>,
    pub assets: Vec<&'a Asset>,
}

pub fn extract_directives(roots: &[Slot]) -> Directives<'_> {
    let mut directives = Directives::default();

    let found = extract_types(roots, &[NodeKind::Head, NodeKind::Modifier, NodeKind::Asset]);
    for node in found.into_iter().flatten() {
        match node {
            Node::Head(head) => directives.heads.push(head),
            Node::Modifier(modifier) => directives.modifiers.push(modifier),
            Node::Asset(asset) => directives.assets.push(asset),
            _ => {}
        }
    }

    directives
}
