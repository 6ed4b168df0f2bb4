//! The live-tree platform as seen by the engine.
//!
//! Brook never creates or mutates live nodes directly; every operation goes through
//! [`HostTree`]. Node handles are cheap clones (an id, an index, a reference-counted
//! pointer) and double as keys of the [`EventRegistry`](crate::EventRegistry).

use core::fmt::Debug;
use core::hash::Hash;
use std::rc::Rc;

use crate::event::Event;

/// Callback attached to a live node by [`HostTree::add_listener`].
///
/// The second argument is the propagation path of the event: the origin node first,
/// followed by its ancestors outwards.
pub type Listener<N> = Rc<dyn Fn(&mut Event, &[N])>;

/// Propagation phase a listener runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Runs while the event travels from the root towards the origin.
    Capture,
    /// Runs while the event travels from the origin back to the root.
    #[default]
    Bubble,
}

/// Live tree operations consumed by the engine.
///
/// Failures are never retried or wrapped beyond [`RenderError::Host`](crate::RenderError);
/// they surface to the caller of the render call as-is.
#[allow(clippy::missing_errors_doc)]
pub trait HostTree {
    /// Handle identifying a live node.
    type Node: Clone + Eq + Hash + Debug + 'static;
    /// Failure reported by the platform.
    type Error: std::error::Error + 'static;

    /// Creates a detached text node.
    fn create_text_node(&mut self, content: &str) -> Result<Self::Node, Self::Error>;

    /// Creates a detached element node.
    fn create_element_node(&mut self, tag: &str) -> Result<Self::Node, Self::Error>;

    /// Sets a string attribute.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str)
    -> Result<(), Self::Error>;

    /// Removes an attribute. Removing a missing attribute is not an error.
    fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), Self::Error>;

    /// Sets a boolean property (`checked`, `disabled`, ...) on the live object.
    fn set_boolean_property(
        &mut self,
        node: &Self::Node,
        name: &str,
        value: bool,
    ) -> Result<(), Self::Error>;

    /// Replaces the content of a text node.
    fn set_text_content(&mut self, node: &Self::Node, content: &str) -> Result<(), Self::Error>;

    /// Appends `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

    /// Inserts `child` before `reference`, or appends when `reference` is `None`.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), Self::Error>;

    /// Detaches `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

    /// Puts `new_child` where `old_child` was and detaches `old_child`.
    fn replace_child(
        &mut self,
        parent: &Self::Node,
        new_child: &Self::Node,
        old_child: &Self::Node,
    ) -> Result<(), Self::Error>;

    /// Returns the child of `parent` at `index`.
    fn child_at(&self, parent: &Self::Node, index: usize) -> Option<Self::Node>;

    /// Subscribes `listener` to `event_type` events reaching `target`.
    fn add_listener(
        &mut self,
        target: &Self::Node,
        event_type: &str,
        listener: Listener<Self::Node>,
        phase: Phase,
    ) -> Result<(), Self::Error>;

    /// Detaches every child of `parent`.
    fn clear_children(&mut self, parent: &Self::Node) -> Result<(), Self::Error> {
        while let Some(child) = self.child_at(parent, 0) {
            self.remove_child(parent, &child)?;
        }
        Ok(())
    }
}

/// The result of materializing a normalized node.
///
/// A fragment is only a carrier: its members are spliced into whatever parent
/// consumes it and the grouping itself is never attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mounted<N> {
    /// A single live node.
    Single(N),
    /// Sibling live nodes without a wrapper.
    Fragment(Vec<N>),
}

impl<N> Mounted<N> {
    /// Returns the carried nodes in order.
    #[must_use]
    pub fn into_nodes(self) -> Vec<N> {
        match self {
            Self::Single(node) => vec![node],
            Self::Fragment(nodes) => nodes,
        }
    }
}
