//! Delegated event handling.
//!
//! Handlers declared through `on*` properties are not attached to live nodes. They are
//! stored in an [`EventRegistry`] keyed by the live node handle, and a single listener
//! per event type is installed on the render container. When a native event reaches the
//! container, [`dispatch`] walks the propagation path from the origin node up to (but
//! excluding) the container and runs the handlers registered on every node it visits.
//!
//! Entries are removed explicitly: when the reconciler drops a live node it prunes the
//! node and its descendants from the registry.

use core::fmt;
use core::hash::Hash;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::host::{HostTree, Listener, Phase};

/// Event types that get a delegated listener by default.
pub const SUPPORTED_EVENTS: [&str; 14] = [
    "click",
    "change",
    "input",
    "submit",
    "focus",
    "blur",
    "keydown",
    "keyup",
    "keypress",
    "mousedown",
    "mouseup",
    "mousemove",
    "mouseover",
    "mouseout",
];

/// Maps an `on`-prefixed property key to the event type it listens for.
///
/// `onClick` becomes `click`, `onMouseDown` becomes `mousedown`. Keys without the
/// prefix, or with nothing after it, are not event keys.
#[must_use]
pub fn event_type_for(key: &str) -> Option<String> {
    key.strip_prefix("on")
        .filter(|rest| !rest.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Event object passed to handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    event_type: String,
    value: Option<String>,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl Event {
    /// Creates an event of the given type.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            value: None,
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    /// Attaches the current value of the origin node, as carried by `input` and
    /// `change` events.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// The event type, for example `click`.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The value payload, if the host supplied one.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Stops the event from reaching handlers on outer ancestors.
    pub const fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Returns `true` once [`Event::stop_propagation`] was called.
    #[must_use]
    pub const fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Marks the host's default action as cancelled.
    pub const fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Returns `true` once [`Event::prevent_default`] was called.
    #[must_use]
    pub const fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Shared, identity-compared event handler.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&mut Event)>);

impl_debug!(EventHandler);

impl EventHandler {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&mut Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Runs the handler.
    pub fn call(&self, event: &mut Event) {
        (self.0)(event);
    }

    /// Returns `true` if both handles point at the same closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

type HandlerMap = HashMap<String, Vec<EventHandler>>;

struct RegistryState<N> {
    handlers: HashMap<N, HandlerMap>,
    delegated: HashSet<N>,
}

/// Side table from live node handles to their event handlers.
///
/// The registry is a cheap handle around shared state: clones observe the same
/// entries, which lets delegated listeners on the host reach the handlers registered
/// by later renders. Lookups for unknown nodes simply find no handlers.
pub struct EventRegistry<N> {
    state: Rc<RefCell<RegistryState<N>>>,
}

impl<N> Clone for EventRegistry<N> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<N> Default for EventRegistry<N> {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(RegistryState {
                handlers: HashMap::new(),
                delegated: HashSet::new(),
            })),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for EventRegistry<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EventRegistry")
            .field("nodes", &state.handlers.len())
            .field("delegated", &state.delegated)
            .finish()
    }
}

impl<N: Clone + Eq + Hash> EventRegistry<N> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event_type` events reaching `node`.
    ///
    /// Handlers run in registration order. Registering the same handler twice is a
    /// no-op.
    pub fn register(&self, node: &N, event_type: &str, handler: EventHandler) {
        let mut state = self.state.borrow_mut();
        let handlers = state
            .handlers
            .entry(node.clone())
            .or_default()
            .entry(event_type.to_owned())
            .or_default();
        if !handlers.iter().any(|existing| existing.ptr_eq(&handler)) {
            handlers.push(handler);
        }
    }

    /// Removes `handler` from `node`. Empty handler lists and empty node entries are
    /// dropped immediately.
    ///
    /// Returns `true` if the handler was registered.
    pub fn unregister(&self, node: &N, event_type: &str, handler: &EventHandler) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(types) = state.handlers.get_mut(node) else {
            return false;
        };
        let Some(handlers) = types.get_mut(event_type) else {
            return false;
        };

        let before = handlers.len();
        handlers.retain(|existing| !existing.ptr_eq(handler));
        let removed = handlers.len() != before;

        if handlers.is_empty() {
            types.remove(event_type);
        }
        if types.is_empty() {
            state.handlers.remove(node);
        }
        removed
    }

    /// Snapshot of the handlers registered on `node` for `event_type`.
    ///
    /// The snapshot lets handlers re-enter the registry (for example by re-rendering)
    /// while a dispatch is running.
    #[must_use]
    pub fn handlers(&self, node: &N, event_type: &str) -> Vec<EventHandler> {
        self.state
            .borrow()
            .handlers
            .get(node)
            .and_then(|types| types.get(event_type))
            .cloned()
            .unwrap_or_default()
    }

    /// Returns `true` if any handler is registered on `node`.
    #[must_use]
    pub fn contains(&self, node: &N) -> bool {
        self.state.borrow().handlers.contains_key(node)
    }

    /// Number of nodes with at least one handler.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().handlers.len()
    }

    /// Returns `true` if no node has handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().handlers.is_empty()
    }

    /// Drops every handler registered on `node`.
    pub fn prune(&self, node: &N) -> bool {
        self.state.borrow_mut().handlers.remove(node).is_some()
    }

    /// Returns `true` if delegated listeners were installed on `container`.
    #[must_use]
    pub fn is_delegated(&self, container: &N) -> bool {
        self.state.borrow().delegated.contains(container)
    }

    fn mark_delegated(&self, container: &N) {
        self.state.borrow_mut().delegated.insert(container.clone());
    }
}

/// Prunes `root` and all of its live descendants from the registry.
pub(crate) fn release_subtree<H: HostTree>(
    host: &H,
    events: &EventRegistry<H::Node>,
    root: &H::Node,
) {
    if events.is_empty() {
        return;
    }

    let mut pending = vec![root.clone()];
    while let Some(node) = pending.pop() {
        if events.prune(&node) {
            trace!(?node, "pruned event handlers");
        }
        pending.extend((0..).map_while(|index| host.child_at(&node, index)));
    }
}

/// Runs the handlers for `event` along `path`.
///
/// `path` starts at the origin node and lists its ancestors outwards. The walk stops
/// before `container`. Nothing runs if propagation was already stopped. Every handler on
/// a level runs; a stop requested by one of them keeps the walk from reaching the next
/// level.
///
/// Returns the number of handlers invoked.
pub fn dispatch<N: Clone + Eq + Hash>(
    events: &EventRegistry<N>,
    container: &N,
    event: &mut Event,
    path: &[N],
) -> usize {
    if event.is_propagation_stopped() {
        return 0;
    }

    let mut invoked = 0;
    for node in path.iter().take_while(|node| *node != container) {
        let handlers = events.handlers(node, event.event_type());
        for handler in &handlers {
            handler.call(event);
        }
        invoked += handlers.len();

        if event.is_propagation_stopped() {
            break;
        }
    }
    invoked
}

fn delegated_listener<N>(events: EventRegistry<N>, container: N) -> Listener<N>
where
    N: Clone + Eq + Hash + 'static,
{
    Rc::new(move |event: &mut Event, path: &[N]| {
        dispatch(&events, &container, event, path);
    })
}

/// Installs one bubbling listener per [`SUPPORTED_EVENTS`] entry on `container`.
///
/// Returns `false` without touching the host if `container` already has them.
///
/// # Errors
///
/// Propagates the host's failure to add a listener.
pub fn install_delegation<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    container: &H::Node,
) -> Result<bool, H::Error> {
    install_delegation_for(host, events, container, SUPPORTED_EVENTS)
}

/// Installs one bubbling listener per given event type on `container`.
///
/// Idempotent per container, like [`install_delegation`].
///
/// # Errors
///
/// Propagates the host's failure to add a listener. The container is only recorded as
/// delegated once every listener was added.
pub fn install_delegation_for<H, I, S>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    container: &H::Node,
    event_types: I,
) -> Result<bool, H::Error>
where
    H: HostTree,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if events.is_delegated(container) {
        trace!(?container, "delegated listeners already installed");
        return Ok(false);
    }

    let mut installed = 0usize;
    for event_type in event_types {
        let listener = delegated_listener(events.clone(), container.clone());
        host.add_listener(container, event_type.as_ref(), listener, Phase::Bubble)?;
        installed += 1;
    }

    events.mark_delegated(container);
    debug!(?container, listeners = installed, "installed delegated listeners");
    Ok(true)
}
