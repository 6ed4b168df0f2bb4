//! Positional reconciliation of two normalized trees.
//!
//! [`patch`] compares the node that used to live at `index` under `parent` with the
//! node that should live there now and applies the smallest edit it knows of:
//!
//! 1. nothing on either side: no-op;
//! 2. only a new node: materialize and insert it at `index` (append if the slot is past
//!    the end);
//! 3. only an old node: remove the live child at `index`;
//! 4. two text nodes: rewrite the text content in place when it changed;
//! 5. two elements with different tags, or any other change of kind: materialize the
//!    new node and replace the old one wholesale;
//! 6. two elements with the same tag: reconcile properties on the existing live node,
//!    then recurse into the children by position.
//!
//! There is no keyed matching. Children are compared index by index, surplus new
//! children are appended and surplus old children are removed from the back.

use tracing::trace;

use crate::error::RenderError;
use crate::event::{EventRegistry, event_type_for, release_subtree};
use crate::host::{HostTree, Mounted};
use crate::materialize::{attribute_name, attribute_value, is_boolean_property, materialize};
use crate::normalize::Node;
use crate::vnode::{PropValue, Props, is_reserved};

type PatchResult<H> = Result<(), RenderError<<H as HostTree>::Error>>;

/// Brings the live child at `index` under `parent` in line with `new`.
///
/// `old` must describe what is currently live at that position: the reconciler trusts
/// it instead of reading the live tree back.
///
/// # Errors
///
/// Returns [`RenderError::MissingChild`] when the live tree has no child where `old`
/// says there is one, and propagates host failures. The live tree is left as it was at
/// the moment of the failure.
pub fn patch<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    parent: &H::Node,
    new: Option<&Node>,
    old: Option<&Node>,
    index: usize,
) -> PatchResult<H> {
    match (new, old) {
        (None, None) => Ok(()),
        (Some(new), None) => insert(host, events, parent, new, index),
        (None, Some(old)) => remove(host, events, parent, old, index),
        (Some(new), Some(old)) => update(host, events, parent, new, old, index),
    }
}

fn live_child<H: HostTree>(
    host: &H,
    parent: &H::Node,
    index: usize,
) -> Result<H::Node, RenderError<H::Error>> {
    host.child_at(parent, index)
        .ok_or(RenderError::MissingChild { index })
}

/// Places the members of `mounted` before `reference`, or at the end.
fn place<H: HostTree>(
    host: &mut H,
    parent: &H::Node,
    mounted: Mounted<H::Node>,
    reference: Option<&H::Node>,
) -> Result<usize, H::Error> {
    let mut placed = 0;
    for live in mounted.into_nodes() {
        match reference {
            Some(reference) => host.insert_before(parent, &live, Some(reference))?,
            None => host.append_child(parent, &live)?,
        }
        placed += 1;
    }
    Ok(placed)
}

fn insert<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    parent: &H::Node,
    new: &Node,
    index: usize,
) -> PatchResult<H> {
    trace!(index, "inserting node");
    let mounted = materialize(host, events, new)?;
    let reference = host.child_at(parent, index);
    place(host, parent, mounted, reference.as_ref())?;
    Ok(())
}

/// Removes the `count` live children starting at `index`, pruning their handlers.
fn remove_slots<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    parent: &H::Node,
    index: usize,
    count: usize,
) -> PatchResult<H> {
    for _ in 0..count {
        let live = live_child(host, parent, index)?;
        release_subtree(host, events, &live);
        host.remove_child(parent, &live)?;
    }
    Ok(())
}

fn remove<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    parent: &H::Node,
    old: &Node,
    index: usize,
) -> PatchResult<H> {
    trace!(index, "removing node");
    remove_slots(host, events, parent, index, old.slot_count())
}

fn update<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    parent: &H::Node,
    new: &Node,
    old: &Node,
    index: usize,
) -> PatchResult<H> {
    match (new, old) {
        (Node::Text(next), Node::Text(previous)) => {
            if next != previous {
                trace!(index, "updating text");
                let live = live_child(host, parent, index)?;
                host.set_text_content(&live, next)?;
            }
            Ok(())
        }
        (Node::Element(next), Node::Element(previous)) if next.tag == previous.tag => {
            let live = live_child(host, parent, index)?;
            update_props(host, events, &live, &next.props, &previous.props)?;
            patch_children(host, events, &live, &next.children, &previous.children, 0)
        }
        (Node::Fragment(next), Node::Fragment(previous)) => {
            patch_children(host, events, parent, next, previous, index)
        }
        _ => replace(host, events, parent, new, old, index),
    }
}

/// Reconciles two sibling lists positioned at `offset` under `parent`.
fn patch_children<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    parent: &H::Node,
    next: &[Node],
    previous: &[Node],
    offset: usize,
) -> PatchResult<H> {
    let shared = next.len().min(previous.len());

    for (i, (new, old)) in next.iter().zip(previous).enumerate() {
        patch(host, events, parent, Some(new), Some(old), offset + i)?;
    }
    for (i, new) in next.iter().enumerate().skip(shared) {
        patch(host, events, parent, Some(new), None, offset + i)?;
    }
    // Back to front, so every index still points at the node it names.
    for i in (shared..previous.len()).rev() {
        patch(host, events, parent, None, Some(&previous[i]), offset + i)?;
    }
    Ok(())
}

fn replace<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    parent: &H::Node,
    new: &Node,
    old: &Node,
    index: usize,
) -> PatchResult<H> {
    trace!(index, "replacing node");
    let mounted = materialize(host, events, new)?;
    let old_slots = old.slot_count();

    match mounted {
        Mounted::Single(live) if old_slots == 1 => {
            let current = live_child(host, parent, index)?;
            release_subtree(host, events, &current);
            host.replace_child(parent, &live, &current)?;
            Ok(())
        }
        mounted => {
            let reference = host.child_at(parent, index);
            let placed = place(host, parent, mounted, reference.as_ref())?;
            remove_slots(host, events, parent, index + placed, old_slots)
        }
    }
}

/// Applies the difference between two property bags to a live node.
///
/// Keys whose value did not change are skipped without touching the host.
fn update_props<H: HostTree>(
    host: &mut H,
    events: &EventRegistry<H::Node>,
    node: &H::Node,
    next: &Props,
    previous: &Props,
) -> Result<(), H::Error> {
    let added = next.keys().filter(|key| !previous.contains_key(key));

    for key in previous.keys().chain(added) {
        if is_reserved(key) {
            continue;
        }

        let before = previous.get(key);
        let after = next.get(key);
        if before == after {
            continue;
        }

        if let Some(event_type) = event_type_for(key) {
            if let Some(handler) = before.and_then(PropValue::as_handler) {
                events.unregister(node, &event_type, handler);
            }
            if let Some(handler) = after.and_then(PropValue::as_handler) {
                events.register(node, &event_type, handler.clone());
            }
        }

        let name = attribute_name(key);
        match after.and_then(|value| attribute_value(key, value)) {
            Some(text) => host.set_attribute(node, name, &text)?,
            // The old value left no attribute to remove.
            None if before.is_some_and(|value| attribute_value(key, value).is_none()) => {}
            None => host.remove_attribute(node, name)?,
        }
        if is_boolean_property(key) {
            host.set_boolean_property(node, key, after.is_some_and(PropValue::is_truthy))?;
        }
    }
    Ok(())
}
