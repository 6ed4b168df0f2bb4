//! Building live nodes from a normalized tree.

use tracing::trace;

use crate::error::RenderError;
use crate::event::{EventRegistry, event_type_for};
use crate::host::{HostTree, Mounted};
use crate::normalize::{ElementNode, Node};
use crate::vnode::{PropValue, Props, VNode, is_reserved};

/// Properties that mirror a boolean property on the live object.
pub(crate) const BOOLEAN_PROPERTIES: [&str; 4] = ["checked", "disabled", "selected", "readOnly"];

pub(crate) fn is_boolean_property(key: &str) -> bool {
    BOOLEAN_PROPERTIES.contains(&key)
}

/// Attribute name a property key is written under.
pub(crate) fn attribute_name(key: &str) -> &str {
    if key == "className" { "class" } else { key }
}

/// Text of the attribute `value` leaves on a node under `key`, `None` when absent.
pub(crate) fn attribute_value(key: &str, value: &PropValue) -> Option<String> {
    match value {
        PropValue::Bool(true) => Some(String::new()),
        other => other
            .to_attribute_value()
            .filter(|text| key != "className" || !text.is_empty()),
    }
}

/// Creates the live counterpart of `node`.
///
/// Elements are built with all of their properties applied and children attached;
/// fragments come back as [`Mounted::Fragment`] so the caller can splice the members.
///
/// # Errors
///
/// Propagates host failures.
pub fn materialize<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    node: &Node,
) -> Result<Mounted<H::Node>, RenderError<H::Error>> {
    match node {
        Node::Text(text) => Ok(Mounted::Single(host.create_text_node(text)?)),
        Node::Element(element) => materialize_element(host, events, element).map(Mounted::Single),
        Node::Fragment(members) => {
            let mut nodes = Vec::with_capacity(members.len());
            for member in members {
                nodes.extend(materialize(host, events, member)?.into_nodes());
            }
            Ok(Mounted::Fragment(nodes))
        }
    }
}

/// Materializes a raw virtual tree that is expected to be normalized already.
///
/// # Errors
///
/// Returns [`RenderError::Unnormalized`] when the tree still contains a component, and
/// propagates host failures.
pub fn materialize_vnode<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    vnode: &VNode,
) -> Result<Mounted<H::Node>, RenderError<H::Error>> {
    let node = Node::try_from(vnode.clone()).map_err(|error| RenderError::Unnormalized {
        component: error.component,
    })?;
    materialize(host, events, &node)
}

fn materialize_element<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    element: &ElementNode,
) -> Result<H::Node, RenderError<H::Error>> {
    let live = host.create_element_node(&element.tag)?;
    trace!(tag = %element.tag, node = ?live, "created element");
    apply_props(host, events, &live, &element.props)?;

    for child in &element.children {
        for member in materialize(host, events, child)?.into_nodes() {
            host.append_child(&live, &member)?;
        }
    }
    Ok(live)
}

/// Writes every property of a freshly created node.
fn apply_props<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    node: &H::Node,
    props: &Props,
) -> Result<(), H::Error> {
    for (key, value) in props.iter() {
        if is_reserved(key) {
            continue;
        }

        if let PropValue::Handler(handler) = value
            && let Some(event_type) = event_type_for(key)
        {
            events.register(node, &event_type, handler.clone());
            continue;
        }

        if let Some(text) = attribute_value(key, value) {
            host.set_attribute(node, attribute_name(key), &text)?;
        }
        if is_boolean_property(key) && value.is_truthy() {
            host.set_boolean_property(node, key, true)?;
        }
    }
    Ok(())
}
