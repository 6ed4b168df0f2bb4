use brook_core::{NormalizeError, RenderError};
use thiserror::Error;

/// Errors returned by [`Renderer`](crate::Renderer).
///
/// `E` is the host tree's error type.
#[derive(Debug, Error)]
pub enum Error<E> {
    /// A component failed while the new tree was being normalized. The live tree was
    /// not touched.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    /// Materializing or reconciling the live tree failed part-way.
    #[error(transparent)]
    Render(#[from] RenderError<E>),
}

impl<E> Error<E> {
    /// Returns the host failure, if this error came from the host tree.
    #[must_use]
    pub const fn host(&self) -> Option<&E> {
        match self {
            Self::Render(RenderError::Host(error)) => Some(error),
            _ => None,
        }
    }
}
