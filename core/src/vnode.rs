//! Virtual node model.
//!
//! A [`VNode`] is an immutable description of a piece of UI. Trees are usually built
//! with [`h`], which accepts a tag name or a [`Component`], a [`Props`] bag and a child
//! list. Child lists may nest arbitrarily; [`h`] flattens them and drops `None` and
//! boolean entries so the stored children are always a flat sequence.

use core::any::type_name;
use core::fmt;
use std::rc::Rc;

use crate::event::{Event, EventHandler};

/// Property keys that are consumed by the engine and never reach the live node.
pub(crate) const RESERVED_KEYS: [&str; 2] = ["children", "key"];

pub(crate) fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Formats a number the way the host platform prints it in attributes and text.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if value == 0.0 {
        return "0".to_owned();
    }
    if value.fract() == 0.0 && value.abs() < 1e21 {
        return format!("{value:.0}");
    }
    value.to_string()
}

/// A single property value.
#[derive(Debug, Clone, Default)]
pub enum PropValue {
    /// Explicit absence. Reconciling to `Null` removes the attribute.
    #[default]
    Null,
    /// Valueless attribute: present when `true`, absent when `false`.
    Bool(bool),
    /// Numeric value, written in its string form.
    Number(f64),
    /// String value, written verbatim.
    Str(String),
    /// Event handler, registered with the event registry instead of being written.
    Handler(EventHandler),
}

impl PropValue {
    /// Returns the handler stored in this value, if any.
    #[must_use]
    pub const fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Self::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    /// Truthiness as the host platform understands it.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(flag) => *flag,
            Self::Number(number) => *number != 0.0 && !number.is_nan(),
            Self::Str(text) => !text.is_empty(),
            Self::Handler(_) => true,
        }
    }

    /// String form used when the value is written as an attribute.
    ///
    /// Booleans, handlers and `Null` have no attribute string form.
    #[must_use]
    pub fn to_attribute_value(&self) -> Option<String> {
        match self {
            Self::Str(text) => Some(text.clone()),
            Self::Number(number) => Some(format_number(*number)),
            Self::Null | Self::Bool(_) | Self::Handler(_) => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            #[allow(clippy::float_cmp)]
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        Self::Handler(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! impl_number_prop {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropValue {
                fn from(value: $ty) -> Self {
                    Self::Number(f64::from(value))
                }
            }
        )*
    };
}

impl_number_prop!(i32, u32, f64);

/// Wraps a closure into a handler property value.
///
/// Bind it to an `on`-prefixed key (`onClick`, `onInput`, ...) to receive events of
/// the lower-cased remainder of the key.
pub fn handler(f: impl Fn(&mut Event) + 'static) -> PropValue {
    PropValue::Handler(EventHandler::new(f))
}

/// Insertion-ordered property bag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    entries: Vec<(String, PropValue)>,
}

impl Props {
    /// Creates an empty property bag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces a property, returning the updated bag.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a property, returning the previous value.
    ///
    /// Replacing keeps the key at its original position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropValue>,
    ) -> Option<PropValue> {
        let key = key.into();
        let value = value.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(core::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Removes a property.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Looks up a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find_map(|(k, value)| (k == key).then_some(value))
    }

    /// Returns `true` if the bag holds `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the bag is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Properties handed to a component's render function.
#[derive(Debug, Clone, Default)]
pub struct ComponentProps {
    props: Props,
    children: Vec<VNode>,
}

impl ComponentProps {
    /// Creates the argument for a component invocation.
    #[must_use]
    pub const fn new(props: Props, children: Vec<VNode>) -> Self {
        Self { props, children }
    }

    /// Looks up one of the component's own properties.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    /// Children passed to the component, already flattened.
    #[must_use]
    pub fn children(&self) -> &[VNode] {
        &self.children
    }
}

type RenderFn = dyn Fn(&ComponentProps) -> anyhow::Result<VNode>;

/// A function-style component.
///
/// Components only exist before normalization: [`normalize`](crate::normalize) calls the
/// render function once and continues with whatever it returned.
#[derive(Clone)]
pub struct Component {
    name: &'static str,
    render: Rc<RenderFn>,
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

impl Component {
    /// Creates a component from an infallible render function.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&ComponentProps) -> VNode + 'static,
    {
        Self {
            name: type_name::<F>(),
            render: Rc::new(move |props| Ok(render(props))),
        }
    }

    /// Creates a component whose render function can fail.
    ///
    /// A failure aborts the whole render call.
    pub fn try_new<F>(render: F) -> Self
    where
        F: Fn(&ComponentProps) -> anyhow::Result<VNode> + 'static,
    {
        Self {
            name: type_name::<F>(),
            render: Rc::new(render),
        }
    }

    /// Overrides the name reported in errors and traces.
    #[must_use]
    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// The component's name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Invokes the render function.
    ///
    /// # Errors
    ///
    /// Returns whatever error the render function produced.
    pub fn render(&self, props: &ComponentProps) -> anyhow::Result<VNode> {
        (self.render)(props)
    }
}

/// The `type` of a node built with [`h`]: either a tag name or a component.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// Intrinsic host element.
    Tag(String),
    /// Function-style component.
    Component(Component),
}

impl From<&str> for NodeType {
    fn from(value: &str) -> Self {
        Self::Tag(value.to_owned())
    }
}

impl From<Component> for NodeType {
    fn from(value: Component) -> Self {
        Self::Component(value)
    }
}

/// Intrinsic element description.
#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Tag name of the live node.
    pub tag: String,
    /// Properties applied to the live node.
    pub props: Props,
    /// Children, in order.
    pub children: Vec<VNode>,
}

/// A component awaiting evaluation.
#[derive(Debug, Clone)]
pub struct ComponentNode {
    /// The render function.
    pub component: Component,
    /// Properties passed to the render function.
    pub props: Props,
    /// Children passed to the render function.
    pub children: Vec<VNode>,
}

impl ComponentNode {
    /// Calls the component with its properties and children.
    ///
    /// # Errors
    ///
    /// Returns the render function's error.
    pub fn render(&self) -> anyhow::Result<VNode> {
        let props = ComponentProps::new(self.props.clone(), self.children.clone());
        self.component.render(&props)
    }
}

/// Virtual node.
#[derive(Debug, Clone, Default)]
pub enum VNode {
    /// Nothing. Produced from `None` and booleans; normalizes to empty text.
    #[default]
    Empty,
    /// Text content.
    Text(String),
    /// Intrinsic element.
    Element(Element),
    /// Unevaluated component.
    Component(ComponentNode),
    /// A sequence of sibling nodes without a wrapper.
    Fragment(Vec<VNode>),
}

impl VNode {
    /// Creates a fragment out of the given nodes.
    pub fn fragment(nodes: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::Fragment(nodes.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for VNode {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for VNode {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for VNode {
    fn from(_: bool) -> Self {
        Self::Empty
    }
}

impl<T: Into<Self>> From<Option<T>> for VNode {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for VNode {
    fn from(value: Vec<T>) -> Self {
        Self::fragment(value)
    }
}

macro_rules! impl_number_node {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for VNode {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }

            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Self::Node(VNode::from(value))
                }
            }
        )*
    };
}

impl_number_node!(i32, i64, u32, usize);

impl From<f64> for VNode {
    fn from(value: f64) -> Self {
        Self::Text(format_number(value))
    }
}

/// An entry in a child list before flattening.
#[derive(Debug, Clone)]
pub enum Child {
    /// A node kept as-is (unless it is empty or a fragment).
    Node(VNode),
    /// A nested list, spliced into its parent list.
    Many(Vec<Child>),
    /// Absence, dropped.
    Null,
    /// Booleans are dropped so `cond && node`-style expressions can be written.
    Bool(bool),
}

impl From<VNode> for Child {
    fn from(value: VNode) -> Self {
        Self::Node(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Self::Node(VNode::from(value))
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Self::Node(VNode::Text(value))
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Self::Node(VNode::from(value))
    }
}

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Child {
    fn from(value: Vec<T>) -> Self {
        Self::Many(value.into_iter().map(Into::into).collect())
    }
}

/// Flattens a child list into a flat sequence of nodes.
///
/// Nested lists and fragments are spliced in place, `Null`, booleans and
/// [`VNode::Empty`] are dropped, and everything else keeps its left-to-right order.
/// The walk keeps its own stack, so pathological nesting costs heap rather than
/// call-stack depth.
pub fn flatten_children(children: impl IntoIterator<Item = Child>) -> Vec<VNode> {
    let mut flat = Vec::new();
    let mut stack: Vec<std::vec::IntoIter<Child>> =
        vec![children.into_iter().collect::<Vec<_>>().into_iter()];

    while let Some(level) = stack.last_mut() {
        match level.next() {
            None => {
                stack.pop();
            }
            Some(Child::Many(nested)) => stack.push(nested.into_iter()),
            Some(Child::Node(VNode::Fragment(nested))) => {
                let nested: Vec<Child> = nested.into_iter().map(Child::Node).collect();
                stack.push(nested.into_iter());
            }
            Some(Child::Null | Child::Bool(_) | Child::Node(VNode::Empty)) => {}
            Some(Child::Node(node)) => flat.push(node),
        }
    }

    flat
}

/// Builds an element or component node.
///
/// The child list is flattened with [`flatten_children`]. No validation of the tag or
/// the properties happens here.
///
/// ```
/// use brook_core::{children, h, Props, VNode};
///
/// let node = h("div", Props::new(), children![1, vec![2], None::<&str>, true]);
/// let VNode::Element(element) = node else { unreachable!() };
/// assert_eq!(element.children.len(), 2);
/// ```
pub fn h<C: Into<Child>>(
    ty: impl Into<NodeType>,
    props: Props,
    children: impl IntoIterator<Item = C>,
) -> VNode {
    let children = flatten_children(children.into_iter().map(Into::into));
    match ty.into() {
        NodeType::Tag(tag) => VNode::Element(Element {
            tag,
            props,
            children,
        }),
        NodeType::Component(component) => VNode::Component(ComponentNode {
            component,
            props,
            children,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(nodes: &[VNode]) -> Vec<&str> {
        nodes
            .iter()
            .map(|node| match node {
                VNode::Text(text) => text.as_str(),
                other => panic!("expected text, found {other:?}"),
            })
            .collect()
    }

    #[test]
    fn flattens_nested_children_and_drops_null_and_booleans() {
        let node = h(
            "div",
            Props::new(),
            children![1, vec![Child::from(2), Child::from(vec![3])], None::<&str>, false, true],
        );
        let VNode::Element(element) = node else {
            panic!("expected an element");
        };
        assert_eq!(texts(&element.children), ["1", "2", "3"]);
    }

    #[test]
    fn splices_fragments_and_drops_empty_nodes() {
        let node = h(
            "ul",
            Props::new(),
            vec![
                VNode::from("a"),
                VNode::fragment(["b", "c"]),
                VNode::Empty,
                VNode::from("d"),
            ],
        );
        let VNode::Element(element) = node else {
            panic!("expected an element");
        };
        assert_eq!(texts(&element.children), ["a", "b", "c", "d"]);
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let mut nested = Child::from("leaf");
        for _ in 0..100_000 {
            nested = Child::Many(vec![nested]);
        }
        let flat = flatten_children([nested]);
        assert_eq!(texts(&flat), ["leaf"]);
    }

    #[test]
    fn component_type_builds_component_node() {
        let component = Component::new(|_| VNode::Empty).with_name("Empty");
        let node = h(component, Props::new(), children!["x"]);
        let VNode::Component(node) = node else {
            panic!("expected a component node");
        };
        assert_eq!(node.component.name(), "Empty");
        assert_eq!(texts(&node.children), ["x"]);
    }

    #[test]
    fn numbers_format_like_the_host() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(PropValue::from(42).to_attribute_value().as_deref(), Some("42"));
    }

    #[test]
    fn props_keep_insertion_order_on_replace() {
        let mut props = props! { "id" => "a", "title" => "t" };
        assert_eq!(props.insert("id", "b"), Some(PropValue::from("a")));
        assert_eq!(props.keys().collect::<Vec<_>>(), ["id", "title"]);
        assert_eq!(props.remove("title"), Some(PropValue::from("t")));
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn handler_values_compare_by_identity() {
        let first = handler(|_| {});
        let copy = first.clone();
        let second = handler(|_| {});
        assert_eq!(first, copy);
        assert_ne!(first, second);
    }
}
