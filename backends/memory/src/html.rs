//! Markup serialisation of memory trees.

use core::fmt::Write;

use crate::{MemoryTree, NodeId, NodeKind};

fn escape(text: &str, quote: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quote => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}

impl MemoryTree {
    /// Serialises `node` and its subtree.
    ///
    /// Attributes appear in the order they were first written; every element gets an
    /// explicit closing tag. Unknown nodes serialise to an empty string.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    /// Serialises the children of `node`.
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        match self.kind(node) {
            None => {}
            Some(NodeKind::Text(text)) => escape(text, false, out),
            Some(NodeKind::Element {
                tag, attributes, ..
            }) => {
                let _ = write!(out, "<{tag}");
                for (name, value) in attributes {
                    let _ = write!(out, " {name}=\"");
                    escape(value, true, out);
                    out.push('"');
                }
                out.push('>');
                for child in self.children(node) {
                    self.write_node(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use brook_core::HostTree;

    use super::*;

    #[test]
    fn escapes_text_and_attributes() {
        let mut tree = MemoryTree::new();
        let root = tree.create_container("p");
        let text = tree.create_text_node("a < b & c").unwrap();
        tree.set_attribute(&root, "title", "\"quoted\"").unwrap();
        tree.append_child(&root, &text).unwrap();

        assert_eq!(
            tree.outer_html(root),
            "<p title=\"&quot;quoted&quot;\">a &lt; b &amp; c</p>"
        );
        assert_eq!(tree.inner_html(root), "a &lt; b &amp; c");
    }
}
