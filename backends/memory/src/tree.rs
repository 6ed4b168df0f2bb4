//! Arena-backed live tree.

use core::fmt;
use std::collections::BTreeMap;

use brook_core::{Event, HostTree, Listener, Phase};
use tracing::trace;

use crate::error::MemoryError;

/// Handle of a node stored in a [`MemoryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the raw index backing this identifier.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A text node.
    Text(String),
    /// An element with attributes (in write order) and boolean properties.
    Element {
        /// Tag name.
        tag: String,
        /// Attributes, in the order they were first written.
        attributes: Vec<(String, String)>,
        /// Boolean properties set through `set_boolean_property`.
        properties: BTreeMap<String, bool>,
    },
}

/// Number of host operations performed, by kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    /// Text and element nodes created.
    pub created: usize,
    /// `set_attribute` calls.
    pub attribute_writes: usize,
    /// `remove_attribute` calls.
    pub attribute_removals: usize,
    /// `set_boolean_property` calls.
    pub property_writes: usize,
    /// `set_text_content` calls.
    pub text_writes: usize,
    /// `append_child` calls, plus `insert_before` calls without a reference.
    pub appends: usize,
    /// `insert_before` calls with a reference.
    pub insertions: usize,
    /// `remove_child` calls.
    pub removals: usize,
    /// `replace_child` calls.
    pub replacements: usize,
    /// `add_listener` calls.
    pub listeners: usize,
}

struct ListenerEntry {
    event_type: String,
    phase: Phase,
    listener: Listener<NodeId>,
}

struct Entry {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<ListenerEntry>,
}

impl Entry {
    const fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

/// Live tree kept entirely in memory.
///
/// Nodes are never freed: detached nodes stay addressable so tests can inspect what
/// was removed or replaced.
#[derive(Default)]
pub struct MemoryTree {
    nodes: Vec<Entry>,
    counters: Counters,
}

impl fmt::Debug for MemoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTree")
            .field("nodes", &self.nodes.len())
            .field("counters", &self.counters)
            .finish()
    }
}

impl MemoryTree {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            counters: Counters {
                created: 0,
                attribute_writes: 0,
                attribute_removals: 0,
                property_writes: 0,
                text_writes: 0,
                appends: 0,
                insertions: 0,
                removals: 0,
                replacements: 0,
                listeners: 0,
            },
        }
    }

    /// Creates a detached element to render into. Not counted.
    pub fn create_container(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_owned(),
            attributes: Vec::new(),
            properties: BTreeMap::new(),
        })
    }

    /// Operation counts since creation or the last [`MemoryTree::reset_counters`].
    #[must_use]
    pub const fn counters(&self) -> Counters {
        self.counters
    }

    /// Zeroes the operation counts.
    pub fn reset_counters(&mut self) {
        self.counters = Counters::default();
    }

    /// Total number of nodes ever created, attached or not.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node was created yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// What `node` is.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|entry| &entry.kind)
    }

    /// Tag name of an element.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Content of a text node.
    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Value of an attribute.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find_map(|(key, value)| (key == name).then_some(value.as_str())),
            NodeKind::Text(_) => None,
        }
    }

    /// Value of a boolean property, if it was ever set.
    #[must_use]
    pub fn property(&self, node: NodeId, name: &str) -> Option<bool> {
        match self.kind(node)? {
            NodeKind::Element { properties, .. } => properties.get(name).copied(),
            NodeKind::Text(_) => None,
        }
    }

    /// Children of `node`, in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map_or(&[], |entry| entry.children.as_slice())
    }

    /// Parent of `node`, if attached.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    /// `node` followed by its ancestors outwards.
    #[must_use]
    pub fn path(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = vec![node];
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Number of listeners attached to `node` for `event_type`.
    #[must_use]
    pub fn listener_count(&self, node: NodeId, event_type: &str) -> usize {
        self.nodes.get(node.0).map_or(0, |entry| {
            entry
                .listeners
                .iter()
                .filter(|listener| listener.event_type == event_type)
                .count()
        })
    }

    /// Total number of listeners attached to `node`.
    #[must_use]
    pub fn total_listeners(&self, node: NodeId) -> usize {
        self.nodes.get(node.0).map_or(0, |entry| entry.listeners.len())
    }

    /// Fires `event` at `target` and returns it after propagation.
    ///
    /// Capture listeners run from the root down to the target, then bubble listeners
    /// from the target up to the root. Stopping propagation ends the walk after the
    /// current node.
    pub fn fire(&self, target: NodeId, mut event: Event) -> Event {
        let path = self.path(target);
        trace!(%target, event = event.event_type(), "firing event");

        let capture = path.iter().rev().map(|node| (*node, Phase::Capture));
        let bubble = path.iter().map(|node| (*node, Phase::Bubble));

        for (node, phase) in capture.chain(bubble) {
            let Some(entry) = self.nodes.get(node.0) else {
                continue;
            };
            let listeners: Vec<Listener<NodeId>> = entry
                .listeners
                .iter()
                .filter(|entry| entry.phase == phase && entry.event_type == event.event_type())
                .map(|entry| entry.listener.clone())
                .collect();

            for listener in listeners {
                listener(&mut event, &path);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        event
    }

    /// Shorthand for firing a `click` event.
    pub fn click(&self, target: NodeId) -> Event {
        self.fire(target, Event::new("click"))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Entry::new(kind));
        id
    }

    fn entry(&self, node: NodeId) -> Result<&Entry, MemoryError> {
        self.nodes.get(node.0).ok_or(MemoryError::UnknownNode(node))
    }

    fn entry_mut(&mut self, node: NodeId) -> Result<&mut Entry, MemoryError> {
        self.nodes
            .get_mut(node.0)
            .ok_or(MemoryError::UnknownNode(node))
    }

    fn element_parts(
        &mut self,
        node: NodeId,
    ) -> Result<(&mut Vec<(String, String)>, &mut BTreeMap<String, bool>), MemoryError> {
        match &mut self.entry_mut(node)?.kind {
            NodeKind::Element {
                attributes,
                properties,
                ..
            } => Ok((attributes, properties)),
            NodeKind::Text(_) => Err(MemoryError::NotAnElement(node)),
        }
    }

    fn position(&self, parent: NodeId, child: NodeId) -> Result<usize, MemoryError> {
        self.entry(parent)?
            .children
            .iter()
            .position(|candidate| *candidate == child)
            .ok_or(MemoryError::NotAChild { parent, child })
    }

    /// Validates that `child` may go under `parent` and detaches it from its old parent.
    fn adopt(&mut self, parent: NodeId, child: NodeId) -> Result<(), MemoryError> {
        if matches!(self.entry(parent)?.kind, NodeKind::Text(_)) {
            return Err(MemoryError::NotAnElement(parent));
        }
        self.entry(child)?;
        if self.path(parent).contains(&child) {
            return Err(MemoryError::Cycle { parent, child });
        }
        self.detach(child);
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(previous) = self.nodes[child.0].parent.take() {
            self.nodes[previous.0]
                .children
                .retain(|candidate| *candidate != child);
        }
    }

    fn attach_at(&mut self, parent: NodeId, child: NodeId, position: usize) {
        self.nodes[parent.0].children.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
    }
}

impl HostTree for MemoryTree {
    type Node = NodeId;
    type Error = MemoryError;

    fn create_text_node(&mut self, content: &str) -> Result<NodeId, MemoryError> {
        self.counters.created += 1;
        Ok(self.push(NodeKind::Text(content.to_owned())))
    }

    fn create_element_node(&mut self, tag: &str) -> Result<NodeId, MemoryError> {
        self.counters.created += 1;
        Ok(self.create_container(tag))
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), MemoryError> {
        let (attributes, _) = self.element_parts(*node)?;
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => value.clone_into(slot),
            None => attributes.push((name.to_owned(), value.to_owned())),
        }
        self.counters.attribute_writes += 1;
        Ok(())
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) -> Result<(), MemoryError> {
        let (attributes, _) = self.element_parts(*node)?;
        attributes.retain(|(key, _)| key != name);
        self.counters.attribute_removals += 1;
        Ok(())
    }

    fn set_boolean_property(
        &mut self,
        node: &NodeId,
        name: &str,
        value: bool,
    ) -> Result<(), MemoryError> {
        let (_, properties) = self.element_parts(*node)?;
        properties.insert(name.to_owned(), value);
        self.counters.property_writes += 1;
        Ok(())
    }

    fn set_text_content(&mut self, node: &NodeId, content: &str) -> Result<(), MemoryError> {
        match &mut self.entry_mut(*node)?.kind {
            NodeKind::Text(text) => content.clone_into(text),
            NodeKind::Element { .. } => return Err(MemoryError::NotText(*node)),
        }
        self.counters.text_writes += 1;
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), MemoryError> {
        self.adopt(*parent, *child)?;
        let end = self.nodes[parent.0].children.len();
        self.attach_at(*parent, *child, end);
        self.counters.appends += 1;
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), MemoryError> {
        let Some(reference) = reference else {
            return self.append_child(parent, child);
        };
        self.position(*parent, *reference)?;
        self.adopt(*parent, *child)?;
        // Detaching the child may have shifted the reference.
        let position = self.position(*parent, *reference)?;
        self.attach_at(*parent, *child, position);
        self.counters.insertions += 1;
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), MemoryError> {
        self.position(*parent, *child)?;
        self.detach(*child);
        self.counters.removals += 1;
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: &NodeId,
        new_child: &NodeId,
        old_child: &NodeId,
    ) -> Result<(), MemoryError> {
        self.position(*parent, *old_child)?;
        self.adopt(*parent, *new_child)?;
        let position = self.position(*parent, *old_child)?;
        self.detach(*old_child);
        self.attach_at(*parent, *new_child, position);
        self.counters.replacements += 1;
        Ok(())
    }

    fn child_at(&self, parent: &NodeId, index: usize) -> Option<NodeId> {
        self.children(*parent).get(index).copied()
    }

    fn add_listener(
        &mut self,
        target: &NodeId,
        event_type: &str,
        listener: Listener<NodeId>,
        phase: Phase,
    ) -> Result<(), MemoryError> {
        self.entry_mut(*target)?.listeners.push(ListenerEntry {
            event_type: event_type.to_owned(),
            phase,
            listener,
        });
        self.counters.listeners += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn element(tree: &mut MemoryTree, tag: &str) -> NodeId {
        tree.create_element_node(tag).unwrap()
    }

    #[test]
    fn append_moves_nodes_between_parents() {
        let mut tree = MemoryTree::new();
        let first = element(&mut tree, "div");
        let second = element(&mut tree, "div");
        let child = tree.create_text_node("x").unwrap();

        tree.append_child(&first, &child).unwrap();
        tree.append_child(&second, &child).unwrap();

        assert!(tree.children(first).is_empty());
        assert_eq!(tree.children(second), [child]);
        assert_eq!(tree.parent(child), Some(second));
    }

    #[test]
    fn insert_before_and_replace_keep_positions() {
        let mut tree = MemoryTree::new();
        let list = element(&mut tree, "ul");
        let a = element(&mut tree, "li");
        let b = element(&mut tree, "li");
        let c = element(&mut tree, "li");

        tree.append_child(&list, &a).unwrap();
        tree.append_child(&list, &c).unwrap();
        tree.insert_before(&list, &b, Some(&c)).unwrap();
        assert_eq!(tree.children(list), [a, b, c]);

        let d = element(&mut tree, "li");
        tree.replace_child(&list, &d, &b).unwrap();
        assert_eq!(tree.children(list), [a, d, c]);
        assert_eq!(tree.parent(b), None);

        let counters = tree.counters();
        assert_eq!(counters.appends, 2);
        assert_eq!(counters.insertions, 1);
        assert_eq!(counters.replacements, 1);
    }

    #[test]
    fn invalid_operations_are_reported() {
        let mut tree = MemoryTree::new();
        let parent = element(&mut tree, "div");
        let stranger = element(&mut tree, "span");
        let text = tree.create_text_node("t").unwrap();

        assert_eq!(
            tree.remove_child(&parent, &stranger),
            Err(MemoryError::NotAChild {
                parent,
                child: stranger
            })
        );
        assert_eq!(
            tree.append_child(&text, &stranger),
            Err(MemoryError::NotAnElement(text))
        );
        assert_eq!(
            tree.set_text_content(&parent, "x"),
            Err(MemoryError::NotText(parent))
        );

        tree.append_child(&parent, &stranger).unwrap();
        assert_eq!(
            tree.append_child(&stranger, &parent),
            Err(MemoryError::Cycle {
                parent: stranger,
                child: parent
            })
        );
    }

    #[test]
    fn attributes_overwrite_in_place() {
        let mut tree = MemoryTree::new();
        let node = element(&mut tree, "input");
        tree.set_attribute(&node, "type", "text").unwrap();
        tree.set_attribute(&node, "value", "a").unwrap();
        tree.set_attribute(&node, "type", "checkbox").unwrap();
        tree.set_boolean_property(&node, "checked", true).unwrap();

        assert_eq!(tree.attribute(node, "type"), Some("checkbox"));
        assert_eq!(tree.property(node, "checked"), Some(true));
        assert_eq!(tree.counters().attribute_writes, 3);
        assert_eq!(
            tree.outer_html(node),
            r#"<input type="checkbox" value="a"></input>"#
        );
    }

    #[test]
    fn fire_captures_then_bubbles() {
        let mut tree = MemoryTree::new();
        let root = element(&mut tree, "div");
        let button = element(&mut tree, "button");
        tree.append_child(&root, &button).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        for (node, phase, label) in [
            (root, Phase::Bubble, "root-bubble"),
            (button, Phase::Bubble, "button-bubble"),
            (root, Phase::Capture, "root-capture"),
        ] {
            let log = Rc::clone(&log);
            let listener: Listener<NodeId> = Rc::new(move |_event: &mut Event, path: &[NodeId]| {
                assert_eq!(path.len(), 2);
                log.borrow_mut().push(label);
            });
            tree.add_listener(&node, "click", listener, phase).unwrap();
        }

        tree.click(button);
        assert_eq!(
            *log.borrow(),
            ["root-capture", "button-bubble", "root-bubble"]
        );
        assert_eq!(tree.listener_count(root, "click"), 2);
    }

    #[test]
    fn stopped_events_do_not_reach_ancestors() {
        let mut tree = MemoryTree::new();
        let root = element(&mut tree, "div");
        let button = element(&mut tree, "button");
        tree.append_child(&root, &button).unwrap();

        let reached = Rc::new(RefCell::new(false));
        let stop: Listener<NodeId> = Rc::new(|event: &mut Event, _: &[NodeId]| event.stop_propagation());
        let mark: Listener<NodeId> = {
            let reached = Rc::clone(&reached);
            Rc::new(move |_: &mut Event, _: &[NodeId]| *reached.borrow_mut() = true)
        };
        tree.add_listener(&button, "click", stop, Phase::Bubble).unwrap();
        tree.add_listener(&root, "click", mark, Phase::Bubble).unwrap();

        let event = tree.click(button);
        assert!(event.is_propagation_stopped());
        assert!(!*reached.borrow());
    }
}
