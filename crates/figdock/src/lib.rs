//! Tabbed multi-figure window management for plotting backends.
//!
//! figdock lets a plotting library present independently created figures
//! as tabs inside shared windows instead of one window per figure, while
//! staying a drop-in replacement for the library's default
//! one-manager-per-figure backend:
//!
//! - **[`TabWindow`]** owns one window with a tab container, one tab per
//!   figure, and arbitrates which figure is active.
//! - **[`ProxyManager`]** is the one-per-figure adapter handed to the
//!   external figure registry as "the" manager for that figure; it
//!   translates the registry's whole-manager vocabulary into
//!   one-tab-scoped operations.
//! - **[`WindowPool`]** decides on every new-figure request whether the
//!   figure joins the current window or starts a new one, tracks all
//!   live windows, and signals event-loop shutdown when the last window
//!   closes in a non-interactive session.
//!
//! Rendering, widgets, and the event loop stay with the hosting toolkit:
//! the core drives them only through the narrow capability traits in
//! [`toolkit`], and the binding layer wires native callbacks (tab
//! switch, close click, detach click) back into the plain methods here.
//! [`headless`] provides a display-free toolkit for tests and embedding.
//!
//! # Example
//!
//! ```
//! use figdock::headless::{HeadlessCanvas, HeadlessToolkit, NullRegistry};
//! use figdock::{FigureId, NewFigureOptions, WindowConfig, WindowPool};
//!
//! let pool = WindowPool::new(
//!     HeadlessToolkit::new(),
//!     NullRegistry::new(),
//!     WindowConfig::default(),
//! );
//!
//! // Two figures share one window...
//! let fig1 = pool
//!     .new_manager(FigureId(1), HeadlessCanvas::new(640, 480), NewFigureOptions::default())
//!     .unwrap();
//! let fig2 = pool
//!     .new_manager(FigureId(2), HeadlessCanvas::new(640, 480), NewFigureOptions::default())
//!     .unwrap();
//! assert_eq!(pool.window_count(), 1);
//!
//! // ...until one is detached into its own window.
//! fig1.detach().unwrap();
//! assert_eq!(pool.window_count(), 2);
//! # drop(fig2);
//! ```
//!
//! # Threading
//!
//! All mutating operations are expected to run on the UI thread, driven
//! by direct API calls or toolkit callbacks. The types are `Send + Sync`
//! so handles can be stored anywhere, but there is no internal
//! concurrency; the one hazard the core defends against is re-entrant
//! teardown (a figure removal cascading into window destruction).

pub mod error;
mod figure;
pub mod headless;
mod pool;
mod proxy;
pub mod signal;
pub mod toolkit;
mod window;

pub use error::{DockError, Result};
pub use figure::{Figure, FigureId};
pub use pool::{NewFigureOptions, WindowKey, WindowPool};
pub use proxy::{FigureRegistry, ProxyManager};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use toolkit::{
    CanvasHandle, TabId, TabStrip, ToolHost, Toolkit, WidgetError, WindowConfig, WindowHandle,
    WindowParts,
};
pub use window::TabWindow;
