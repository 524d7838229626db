//! HTML Serializer - Convert a resolved tree to markup
//!
//! This module handles:
//! - Element tags with attributes in insertion order
//! - Literal text (escaping already happened at construction)
//! - Empty output for directives and unresolved slots
//!
//! Directives (head, asset, modifier) render as nothing here. Placing
//! them is the document serializer's job.

use crate::element::Element;
use crate::types::{Node, Slot};

impl Element {
    /// Render this element and its subtree
    pub fn stringify(&self) -> String {
        let mut output = String::with_capacity(256);
        self.write_html(&mut output);
        output
    }

    pub fn write_html(&self, output: &mut String) {
        output.push('<');
        output.push_str(self.tag());

        for (name, value) in self.attrs() {
            output.push(' ');
            output.push_str(name);
            output.push_str("=\"");
            output.push_str(value);
            output.push('"');
        }

        output.push('>');

        write_slots(self.content(), output);
        write_slots(self.end_content(), output);

        output.push_str("</");
        output.push_str(self.tag());
        output.push('>');
    }
}

impl Node {
    pub fn write_html(&self, output: &mut String) {
        match self {
            Node::Element(el) => el.write_html(output),
            Node::Text(text) => output.push_str(text.as_str()),
            Node::Asset(_) | Node::Head(_) | Node::Modifier(_) => {}
        }
    }

    pub fn stringify(&self) -> String {
        let mut output = String::new();
        self.write_html(&mut output);
        output
    }
}

/// Render a list of slots; pending slots render empty
pub fn write_slots(slots: &[Slot], output: &mut String) {
    for slot in slots {
        if let Slot::Node(node) = slot {
            node.write_html(output);
        }
    }
}

pub fn to_html(slots: &[Slot]) -> String {
    let mut output = String::with_capacity(4096);
    write_slots(slots, &mut output);
    output
}
