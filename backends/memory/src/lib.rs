//! In-memory host tree for Brook.
//!
//! [`MemoryTree`] implements [`brook_core::HostTree`] on top of an arena of nodes. It
//! stands in for a real platform in tests and headless tooling:
//!
//! - every write is counted in [`Counters`], so tests can assert that reconciliation
//!   did exactly the work it should;
//! - [`MemoryTree::fire`] simulates native event propagation (capture, then bubble)
//!   and runs the listeners attached with `add_listener`;
//! - [`MemoryTree::inner_html`] and [`MemoryTree::outer_html`] serialise subtrees for
//!   readable assertions.

#![deny(missing_debug_implementations)]

mod error;
mod html;
mod tree;

pub use error::MemoryError;
pub use tree::{Counters, MemoryTree, NodeId, NodeKind};
