use thiserror::Error;

/// Errors raised while materializing or reconciling a tree.
///
/// `E` is the host's error type; host failures are passed through untouched.
#[derive(Debug, Error)]
pub enum RenderError<E> {
    /// A component node reached the materializer without being normalized first.
    #[error("component `{component}` must be normalized before it is materialized")]
    Unnormalized {
        /// Name of the offending component.
        component: &'static str,
    },
    /// The live tree has no child where the previous virtual tree says one exists.
    #[error("expected a live child at index {index}, found none")]
    MissingChild {
        /// Position inside the parent.
        index: usize,
    },
    /// The host tree rejected an operation.
    #[error(transparent)]
    Host(#[from] E),
}
