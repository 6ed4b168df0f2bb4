#![doc = include_str!("../README.md")]

mod error;
pub mod logging;
mod renderer;

pub use brook_core::{children, props};
#[doc(inline)]
pub use brook_core::{
    Child, Component, ComponentProps, ElementNode, Event, EventHandler, EventRegistry, HostTree,
    Listener, Mounted, Node, NormalizeError, Phase, PropValue, Props, RenderError,
    SUPPORTED_EVENTS, VNode, dispatch, event, h, handler, host, install_delegation,
    install_delegation_for, materialize, materialize_vnode, normalize, patch, reconcile, vnode,
};
pub use error::Error;
pub use renderer::{RenderOptions, Renderer, RendererBuilder};

#[cfg(test)]
mod tests;

pub mod prelude {
    //! Commonly used items for building and rendering trees.
    //!
    //! ```
    //! use brook::prelude::*;
    //!
    //! let view = h("p", props! { "className" => "greeting" }, children!["hello"]);
    //! # let _ = view;
    //! ```
    pub use crate::{
        Component, ComponentProps, Event, HostTree, PropValue, Props, Renderer, VNode, children,
        h, handler, props,
    };
}
