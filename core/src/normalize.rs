//! Normalization: resolving components and literals into a [`Node`] tree.
//!
//! A normalized tree only contains text, elements and (at the top level) fragments.
//! Components are called exactly once per pass and replaced by what they return.
//! Element children are flattened: fragments are spliced and empty text is dropped.

use thiserror::Error;
use tracing::trace;

use crate::vnode::{ComponentNode, Element, Props, VNode};

/// A normalized virtual node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Text content. The empty string stands for "nothing".
    Text(String),
    /// An element whose children are normalized, non-empty and never fragments.
    Element(ElementNode),
    /// Sibling nodes without a wrapper, never nested.
    Fragment(Vec<Node>),
}

/// A normalized element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementNode {
    /// Tag name.
    pub tag: String,
    /// Properties, including handlers.
    pub props: Props,
    /// Normalized children.
    pub children: Vec<Node>,
}

impl Node {
    /// The empty text node that absent values normalize to.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Returns the text of a text node.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the element of an element node.
    #[must_use]
    pub const fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Number of live sibling slots this node occupies once materialized.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        match self {
            Self::Fragment(members) => members.iter().map(Self::slot_count).sum(),
            Self::Text(_) | Self::Element(_) => 1,
        }
    }
}

/// Failure while normalizing a tree.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A component's render function returned an error.
    #[error("component `{name}` failed to render")]
    Component {
        /// Name of the component.
        name: &'static str,
        /// The render function's error.
        #[source]
        source: anyhow::Error,
    },
}

/// A component was found where only normalized nodes are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("component `{component}` has not been normalized")]
pub struct UnnormalizedNode {
    /// Name of the component.
    pub component: &'static str,
}

/// Normalizes a virtual tree.
///
/// # Errors
///
/// Returns [`NormalizeError::Component`] when a component's render function fails. The
/// error aborts the whole pass.
pub fn normalize(vnode: &VNode) -> Result<Node, NormalizeError> {
    match vnode {
        VNode::Empty => Ok(Node::empty()),
        VNode::Text(text) => Ok(Node::Text(text.clone())),
        VNode::Fragment(items) => {
            let mut members = Vec::with_capacity(items.len());
            for item in items {
                splice_member(normalize(item)?, &mut members);
            }
            Ok(Node::Fragment(members))
        }
        VNode::Component(node) => normalize(&render_component(node)?),
        VNode::Element(element) => normalize_element(element).map(Node::Element),
    }
}

fn render_component(node: &ComponentNode) -> Result<VNode, NormalizeError> {
    let name = node.component.name();
    trace!(component = name, "rendering component");
    node.render()
        .map_err(|source| NormalizeError::Component { name, source })
}

fn normalize_element(element: &Element) -> Result<ElementNode, NormalizeError> {
    let mut children = Vec::with_capacity(element.children.len());
    for child in &element.children {
        push_child(normalize(child)?, &mut children);
    }
    Ok(ElementNode {
        tag: element.tag.clone(),
        props: element.props.clone(),
        children,
    })
}

/// Adds a normalized node to a fragment. Members of nested fragments are already flat.
fn splice_member(node: Node, members: &mut Vec<Node>) {
    match node {
        Node::Fragment(nested) => members.extend(nested),
        other => members.push(other),
    }
}

/// Adds a normalized node to an element's children, dropping empty text.
fn push_child(node: Node, children: &mut Vec<Node>) {
    match node {
        Node::Text(text) if text.is_empty() => {}
        Node::Fragment(members) => {
            for member in members {
                push_child(member, children);
            }
        }
        other => children.push(other),
    }
}

impl From<Node> for VNode {
    fn from(node: Node) -> Self {
        match node {
            Node::Text(text) => Self::Text(text),
            Node::Element(element) => Self::Element(Element {
                tag: element.tag,
                props: element.props,
                children: element.children.into_iter().map(Self::from).collect(),
            }),
            Node::Fragment(members) => Self::Fragment(members.into_iter().map(Self::from).collect()),
        }
    }
}

impl TryFrom<VNode> for Node {
    type Error = UnnormalizedNode;

    /// Converts a component-free virtual tree without calling anything.
    fn try_from(vnode: VNode) -> Result<Self, Self::Error> {
        match vnode {
            VNode::Empty => Ok(Self::empty()),
            VNode::Text(text) => Ok(Self::Text(text)),
            VNode::Component(node) => Err(UnnormalizedNode {
                component: node.component.name(),
            }),
            VNode::Fragment(items) => {
                let mut members = Vec::with_capacity(items.len());
                for item in items {
                    splice_member(Self::try_from(item)?, &mut members);
                }
                Ok(Self::Fragment(members))
            }
            VNode::Element(element) => {
                let mut children = Vec::with_capacity(element.children.len());
                for child in element.children {
                    push_child(Self::try_from(child)?, &mut children);
                }
                Ok(Self::Element(ElementNode {
                    tag: element.tag,
                    props: element.props,
                    children,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::vnode::{Component, h};
    use crate::{children, props};

    fn text(value: &str) -> Node {
        Node::Text(value.to_owned())
    }

    #[test]
    fn literals_normalize_to_text() {
        assert_eq!(normalize(&VNode::Empty).unwrap(), Node::empty());
        assert_eq!(normalize(&VNode::from(false)).unwrap(), Node::empty());
        assert_eq!(normalize(&VNode::from(None::<&str>)).unwrap(), Node::empty());
        assert_eq!(normalize(&VNode::from(12)).unwrap(), text("12"));
        assert_eq!(normalize(&VNode::from(0.5)).unwrap(), text("0.5"));
    }

    #[test]
    fn flattened_children_survive_normalization() {
        let tree = h("div", props! {}, children![1, vec![2, 3], None::<i32>, false, true]);
        let Node::Element(element) = normalize(&tree).unwrap() else {
            panic!("expected an element");
        };
        assert_eq!(element.children, [text("1"), text("2"), text("3")]);
    }

    #[test]
    fn components_are_eliminated() {
        let wrap = Component::new(|props| h("span", Props::new(), props.children().to_vec()));
        let tree = h(
            wrap,
            props! { "title" => "ignored" },
            children!["a", h("b", Props::new(), children!["c"])],
        );

        let normalized = normalize(&tree).unwrap();
        let expected = Node::Element(ElementNode {
            tag: "span".into(),
            props: Props::new(),
            children: vec![
                text("a"),
                Node::Element(ElementNode {
                    tag: "b".into(),
                    props: Props::new(),
                    children: vec![text("c")],
                }),
            ],
        });
        assert_eq!(normalized, expected);
    }

    #[test]
    fn components_see_props_and_children() {
        let greet = Component::new(|props| {
            let name = props
                .get("name")
                .and_then(crate::PropValue::to_attribute_value)
                .unwrap_or_default();
            VNode::from(format!("hello {name} ({} children)", props.children().len()))
        });
        let tree = h(greet, props! { "name" => "ada" }, children!["x", "y"]);
        assert_eq!(normalize(&tree).unwrap(), text("hello ada (2 children)"));
    }

    #[test]
    fn nested_components_resolve_recursively() {
        let inner = Component::new(|_| h("em", Props::new(), children!["inner"]));
        let outer = Component::new(move |_| h(inner.clone(), Props::new(), children![]));
        let Node::Element(element) = normalize(&h(outer, Props::new(), children![])).unwrap()
        else {
            panic!("expected an element");
        };
        assert_eq!(element.tag, "em");
    }

    #[test]
    fn component_is_called_once_per_pass() {
        let calls = Rc::new(Cell::new(0));
        let counted = Component::new({
            let calls = Rc::clone(&calls);
            move |_| {
                calls.set(calls.get() + 1);
                VNode::from("done")
            }
        });
        let tree = h("div", Props::new(), children![h(counted, Props::new(), children![])]);

        let once = normalize(&tree).unwrap();
        assert_eq!(calls.get(), 1);

        let twice = normalize(&VNode::from(once.clone())).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_is_idempotent() {
        let item = Component::new(|props| h("li", Props::new(), props.children().to_vec()));
        let tree = h(
            "ul",
            props! { "className" => "list" },
            children![
                h(item.clone(), Props::new(), children!["one"]),
                "",
                VNode::fragment(vec![h(item, Props::new(), children![2]), VNode::Empty]),
            ],
        );
        let first = normalize(&tree).unwrap();
        let second = normalize(&VNode::from(first.clone())).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_element().map(|e| e.children.len()), Some(2));
    }

    #[test]
    fn component_fragments_splice_into_children() {
        let pair = Component::new(|_| VNode::fragment(["a", "", "b"]));
        let tree = h("p", Props::new(), children![h(pair, Props::new(), children![]), "c"]);
        let Node::Element(element) = normalize(&tree).unwrap() else {
            panic!("expected an element");
        };
        assert_eq!(element.children, [text("a"), text("b"), text("c")]);
    }

    #[test]
    fn top_level_fragment_keeps_members() {
        let tree = VNode::fragment(vec![
            VNode::from("a"),
            VNode::Empty,
            VNode::fragment(["b"]),
        ]);
        assert_eq!(
            normalize(&tree).unwrap(),
            Node::Fragment(vec![text("a"), Node::empty(), text("b")])
        );
    }

    #[test]
    fn failing_component_aborts() {
        let broken = Component::try_new(|_| Err(anyhow::anyhow!("boom"))).with_name("Broken");
        let tree = h("div", Props::new(), children![h(broken, Props::new(), children![])]);
        let error = normalize(&tree).unwrap_err();
        let NormalizeError::Component { name, source } = error;
        assert_eq!(name, "Broken");
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn try_from_rejects_components() {
        let component = Component::new(|_| VNode::Empty).with_name("Lazy");
        let tree = h("div", Props::new(), children![h(component, Props::new(), children![])]);
        assert_eq!(
            Node::try_from(tree),
            Err(UnnormalizedNode { component: "Lazy" })
        );
    }
}
