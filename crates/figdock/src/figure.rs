//! Figure identity and the per-figure canvas handle.
//!
//! A [`Figure`] is an externally owned visual document. figdock never
//! constructs or destroys its pixel content, only its placement: the
//! canvas is reached exclusively through the [`CanvasHandle`] capability
//! trait.

use std::fmt;
use std::sync::Arc;

use crate::toolkit::CanvasHandle;

/// The numeric id assigned to a figure at creation time.
///
/// Ids are handed out by the external figure registry and are unique for
/// the lifetime of the process. A figure keeps its id when it is detached
/// into another window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FigureId(pub u32);

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An externally owned figure, as seen by the window management core.
///
/// Holds the figure's number and its canvas widget. Shared as
/// `Arc<Figure>` between the owning [`TabWindow`](crate::TabWindow) and
/// the figure's [`ProxyManager`](crate::ProxyManager).
pub struct Figure {
    num: FigureId,
    canvas: Arc<dyn CanvasHandle>,
}

impl Figure {
    /// Wrap an externally created canvas as a managed figure.
    pub fn new(num: FigureId, canvas: Arc<dyn CanvasHandle>) -> Arc<Self> {
        Arc::new(Self { num, canvas })
    }

    /// The figure's numeric id.
    pub fn num(&self) -> FigureId {
        self.num
    }

    /// The figure's canvas widget.
    pub fn canvas(&self) -> &Arc<dyn CanvasHandle> {
        &self.canvas
    }
}

impl fmt::Debug for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Figure").field("num", &self.num).finish()
    }
}

static_assertions::assert_impl_all!(Figure: Send, Sync);
