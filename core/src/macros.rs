/// Implements a basic `Debug` trait for types using their type name.
///
/// Used for wrappers around closures, whose contents cannot be printed.
macro_rules! impl_debug {
    ($ty:ty) => {
        impl core::fmt::Debug for $ty {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(core::any::type_name::<Self>())
            }
        }
    };
}

/// Builds a child list out of values of different types.
///
/// Every entry is converted through [`Child::from`](crate::Child), so strings, numbers,
/// booleans, options, nested vectors and [`VNode`](crate::VNode)s can be mixed freely.
///
/// # Usage
///
/// ```
/// use brook_core::{children, h, Props};
///
/// let show_hint = false;
/// let node = h(
///     "p",
///     Props::new(),
///     children!["count: ", 3, show_hint.then(|| "hint"), vec![1, 2]],
/// );
/// # let _ = node;
/// ```
#[macro_export]
macro_rules! children {
    () => {
        ::std::vec::Vec::<$crate::Child>::new()
    };
    ($($child:expr),+ $(,)?) => {
        ::std::vec![$($crate::Child::from($child)),+]
    };
}

/// Builds a [`Props`](crate::Props) bag from `key => value` pairs.
///
/// Values go through [`PropValue::from`](crate::PropValue), so handlers must be wrapped
/// with [`handler`](crate::handler).
///
/// # Usage
///
/// ```
/// use brook_core::{handler, props};
///
/// let props = props! {
///     "id" => "submit",
///     "disabled" => false,
///     "onClick" => handler(|_event| {}),
/// };
/// assert_eq!(props.len(), 3);
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::Props::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Props::new()$(.with($key, $value))+
    };
}
