//! Per-container render entry point.

use std::collections::HashMap;

use brook_core::{
    EventRegistry, HostTree, Node, RenderError, SUPPORTED_EVENTS, VNode, install_delegation_for,
    materialize, normalize, patch,
};
use tracing::debug;

use crate::error::Error;

/// Configuration of a [`Renderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    delegated_events: Vec<String>,
    clear_on_mount: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            delegated_events: SUPPORTED_EVENTS.iter().map(|&event| event.to_owned()).collect(),
            clear_on_mount: true,
        }
    }
}

impl RenderOptions {
    /// Event types that get a delegated listener on every container.
    #[must_use]
    pub fn delegated_events(&self) -> &[String] {
        &self.delegated_events
    }

    /// Whether the first render into a container removes its existing children.
    #[must_use]
    pub const fn clear_on_mount(&self) -> bool {
        self.clear_on_mount
    }
}

/// Builder for [`Renderer`].
#[derive(Debug, Default, Clone)]
pub struct RendererBuilder {
    options: RenderOptions,
}

impl RendererBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the set of delegated event types.
    #[must_use]
    pub fn delegated_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.delegated_events = events.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one event type to the delegated set.
    #[must_use]
    pub fn delegate(mut self, event: impl Into<String>) -> Self {
        let event = event.into();
        if !self.options.delegated_events.contains(&event) {
            self.options.delegated_events.push(event);
        }
        self
    }

    /// Controls whether the first render clears the container.
    #[must_use]
    pub const fn clear_on_mount(mut self, clear: bool) -> Self {
        self.options.clear_on_mount = clear;
        self
    }

    /// Finalises the builder around `host`.
    pub fn build<H: HostTree>(self, host: H) -> Renderer<H> {
        Renderer {
            host,
            events: EventRegistry::new(),
            trees: HashMap::new(),
            options: self.options,
        }
    }
}

/// Renders virtual trees into containers of a host tree.
///
/// The renderer remembers the normalized tree last rendered into every container. The
/// first render into a container builds the live tree from scratch; later renders
/// reconcile against the remembered tree.
#[derive(Debug)]
pub struct Renderer<H: HostTree> {
    host: H,
    events: EventRegistry<H::Node>,
    trees: HashMap<H::Node, Node>,
    options: RenderOptions,
}

impl<H: HostTree> Renderer<H> {
    /// Creates a renderer with the default configuration.
    pub fn new(host: H) -> Self {
        RendererBuilder::new().build(host)
    }

    /// Starts configuring a renderer.
    #[must_use]
    pub fn builder() -> RendererBuilder {
        RendererBuilder::new()
    }

    /// Renders `view` into `container`.
    ///
    /// # Errors
    ///
    /// A component failure is reported before the live tree is touched. Host failures
    /// and a live tree that no longer matches the remembered tree abort the call with the
    /// live tree partially updated; the remembered tree is then left as it was.
    pub fn render(
        &mut self,
        view: impl Into<VNode>,
        container: &H::Node,
    ) -> Result<(), Error<H::Error>> {
        let next = normalize(&view.into())?;

        if let Some(previous) = self.trees.get(container) {
            debug!(?container, "updating container");
            patch(
                &mut self.host,
                &self.events,
                container,
                Some(&next),
                Some(previous),
                0,
            )?;
        } else {
            debug!(?container, "mounting container");
            if self.options.clear_on_mount {
                self.host
                    .clear_children(container)
                    .map_err(RenderError::Host)?;
            }
            let mounted = materialize(&mut self.host, &self.events, &next)?;
            for live in mounted.into_nodes() {
                self.host
                    .append_child(container, &live)
                    .map_err(RenderError::Host)?;
            }
        }

        install_delegation_for(
            &mut self.host,
            &self.events,
            container,
            &self.options.delegated_events,
        )
        .map_err(RenderError::Host)?;

        self.trees.insert(container.clone(), next);
        Ok(())
    }

    /// Removes what was rendered into `container` and forgets its tree.
    ///
    /// The delegated listeners stay installed, so rendering into the container again
    /// does not install them twice. Returns `false` if nothing was rendered there.
    ///
    /// # Errors
    ///
    /// Propagates host failures and a live tree that no longer matches the remembered
    /// tree.
    pub fn unmount(&mut self, container: &H::Node) -> Result<bool, Error<H::Error>> {
        let Some(previous) = self.trees.remove(container) else {
            return Ok(false);
        };
        debug!(?container, "unmounting container");
        patch(
            &mut self.host,
            &self.events,
            container,
            None,
            Some(&previous),
            0,
        )?;
        Ok(true)
    }

    /// The normalized tree last rendered into `container`.
    #[must_use]
    pub fn tree(&self, container: &H::Node) -> Option<&Node> {
        self.trees.get(container)
    }

    /// The event registry shared by every container of this renderer.
    #[must_use]
    pub const fn events(&self) -> &EventRegistry<H::Node> {
        &self.events
    }

    /// The active configuration.
    #[must_use]
    pub const fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Provides immutable access to the host tree.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Provides mutable access to the host tree.
    #[must_use]
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Gives the host tree back.
    pub fn into_host(self) -> H {
        self.host
    }
}
