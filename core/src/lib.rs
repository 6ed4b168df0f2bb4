//! Core reconciliation machinery for Brook.
//!
//! A render pass moves through four stages, each living in its own module:
//!
//! - [`vnode`] - the immutable virtual node model and the [`h`] constructor that
//!   flattens nested child lists.
//! - [`normalize`] - resolves components and literal values into a [`Node`] tree that
//!   only contains text, elements and fragments.
//! - [`materialize`] - builds live host nodes for a normalized tree.
//! - [`reconcile`] - positional diff of two normalized trees, applied directly to the
//!   live tree through the [`HostTree`] trait.
//!
//! Event handlers never become host listeners. They are recorded in an
//! [`EventRegistry`] and reached through one delegated listener per event type installed
//! on the render container (see [`event`]).
//!
//! The crate is platform agnostic: everything that touches live nodes goes through
//! [`HostTree`], and node identity is whatever handle the host hands out.

#[macro_use]
mod macros;
mod error;
pub mod event;
pub mod host;
pub mod materialize;
pub mod normalize;
pub mod reconcile;
pub mod vnode;

pub use error::RenderError;
#[doc(inline)]
pub use event::{
    Event, EventHandler, EventRegistry, SUPPORTED_EVENTS, dispatch, install_delegation,
    install_delegation_for,
};
#[doc(inline)]
pub use host::{HostTree, Listener, Mounted, Phase};
#[doc(inline)]
pub use materialize::{materialize, materialize_vnode};
#[doc(inline)]
pub use normalize::{ElementNode, Node, NormalizeError, UnnormalizedNode, normalize};
#[doc(inline)]
pub use reconcile::patch;
#[doc(inline)]
pub use vnode::{
    Child, Component, ComponentNode, ComponentProps, Element, NodeType, PropValue, Props, VNode,
    h, handler,
};
