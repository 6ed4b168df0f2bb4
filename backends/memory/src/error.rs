use thiserror::Error;

use crate::NodeId;

/// Errors reported by [`MemoryTree`](crate::MemoryTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The handle does not belong to this tree.
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    /// Children and attributes only exist on elements.
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    /// Text content can only be set on text nodes.
    #[error("node {0} is not a text node")]
    NotText(NodeId),
    /// The reference or removed node is not a child of the given parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Expected parent.
        parent: NodeId,
        /// Node that was looked up.
        child: NodeId,
    },
    /// Attaching the node would make it its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle {
        /// Prospective parent.
        parent: NodeId,
        /// Node being attached.
        child: NodeId,
    },
}
