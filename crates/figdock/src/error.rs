//! Error types for figdock.

use thiserror::Error;

use crate::figure::FigureId;
use crate::toolkit::WidgetError;

/// Errors that can occur during figure/window lifecycle operations.
///
/// Lifecycle errors are programming errors on the caller's side: they are
/// reported immediately and never retried internally. Cosmetic toolkit
/// failures (window icons and the like) are logged and swallowed instead
/// of surfacing here.
#[derive(Error, Debug)]
pub enum DockError {
    /// The figure is not managed by the addressed window.
    #[error("figure {0} is not managed by this window")]
    NotManaged(FigureId),

    /// The figure already has a tab in a live window.
    #[error("figure {0} is already managed")]
    AlreadyManaged(FigureId),

    /// The proxy's owning window has already been torn down.
    #[error("proxy for figure {0} has no owning window")]
    StaleProxy(FigureId),

    /// The window is tearing down and cannot accept new figures.
    #[error("window is being torn down")]
    WindowTornDown,

    /// The window pool has been dropped.
    #[error("window pool is gone")]
    PoolGone,

    /// The toolkit failed to create a window.
    #[error("failed to create window: {0}")]
    WindowCreation(#[from] WidgetError),
}

/// A specialized Result type for figdock operations.
pub type Result<T> = std::result::Result<T, DockError>;
