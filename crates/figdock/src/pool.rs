//! The window pool: live-window tracking and the new-figure policy.
//!
//! The [`WindowPool`] is the process-wide decision point invoked on every
//! new-figure request: either the figure joins the current window or a
//! brand-new [`TabWindow`](crate::TabWindow) is created. It also tracks
//! the set of live windows, and is the only place where global shutdown
//! is decided — when the last window deregisters in a non-interactive
//! session, the toolkit's event loop is asked to stop.
//!
//! The "current" window is a non-owning reference: a window destroyed
//! elsewhere simply reads as absent on the next lookup.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use slotmap::{SlotMap, new_key_type};

use crate::error::{DockError, Result};
use crate::figure::{Figure, FigureId};
use crate::proxy::{FigureRegistry, ProxyManager};
use crate::signal::Signal;
use crate::toolkit::{CanvasHandle, Toolkit, WindowConfig};
use crate::window::TabWindow;

new_key_type! {
    /// A unique identifier for a live window in the pool.
    pub struct WindowKey;
}

/// Placement options for a new figure.
#[derive(Debug, Clone, Copy)]
pub struct NewFigureOptions {
    /// Add the figure to the currently active window when one is live;
    /// otherwise a new window is created either way.
    pub reuse_current_window: bool,
}

impl NewFigureOptions {
    /// Place the figure in its own new window.
    pub fn new_window() -> Self {
        Self {
            reuse_current_window: false,
        }
    }
}

impl Default for NewFigureOptions {
    fn default() -> Self {
        Self {
            reuse_current_window: true,
        }
    }
}

/// Process-wide set of live tab windows plus the new-figure policy.
///
/// # Signals
///
/// - [`window_created`](Self::window_created)`(WindowKey)`
/// - [`window_destroyed`](Self::window_destroyed)`(WindowKey)`
pub struct WindowPool {
    toolkit: Arc<dyn Toolkit>,
    registry: Arc<dyn FigureRegistry>,
    config: WindowConfig,
    windows: RwLock<SlotMap<WindowKey, Arc<TabWindow>>>,
    /// Default target for new figures; dead means "no current window".
    current: Mutex<Weak<TabWindow>>,
    /// Emitted after a window is created and registered.
    pub window_created: Signal<WindowKey>,
    /// Emitted after a window has deregistered.
    pub window_destroyed: Signal<WindowKey>,
}

impl WindowPool {
    /// Create a pool over the given toolkit and figure registry.
    ///
    /// `config` is the template applied to every window the pool creates.
    pub fn new(
        toolkit: Arc<dyn Toolkit>,
        registry: Arc<dyn FigureRegistry>,
        config: WindowConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            toolkit,
            registry,
            config,
            windows: RwLock::new(SlotMap::with_key()),
            current: Mutex::new(Weak::new()),
            window_created: Signal::new(),
            window_destroyed: Signal::new(),
        })
    }

    pub(crate) fn toolkit(&self) -> &Arc<dyn Toolkit> {
        &self.toolkit
    }

    pub(crate) fn registry(&self) -> &Arc<dyn FigureRegistry> {
        &self.registry
    }

    pub(crate) fn window_config(&self) -> &WindowConfig {
        &self.config
    }

    // =========================================================================
    // Factory entry points
    // =========================================================================

    /// Create the manager of record for a newly created figure.
    ///
    /// Wraps `canvas` as a [`Figure`] and places it per `options`. The
    /// returned [`ProxyManager`] is what the external registry should
    /// hold as the figure's manager.
    pub fn new_manager(
        self: &Arc<Self>,
        num: FigureId,
        canvas: Arc<dyn CanvasHandle>,
        options: NewFigureOptions,
    ) -> Result<Arc<ProxyManager>> {
        self.new_manager_for_figure(Figure::new(num, canvas), options)
    }

    /// Create the manager of record for an existing figure.
    ///
    /// # Errors
    ///
    /// [`DockError::AlreadyManaged`] if any live window already holds a
    /// figure with this id.
    pub fn new_manager_for_figure(
        self: &Arc<Self>,
        figure: Arc<Figure>,
        options: NewFigureOptions,
    ) -> Result<Arc<ProxyManager>> {
        let num = figure.num();
        if self.find_figure(num).is_some() {
            return Err(DockError::AlreadyManaged(num));
        }
        let window = self.acquire(options.reuse_current_window)?;
        window.add_figure(figure)
    }

    // =========================================================================
    // Window policy
    // =========================================================================

    /// Pick the window a new figure should go to.
    ///
    /// With `reuse` set and a live current window, that window is
    /// returned; otherwise a new window is created, registered, and
    /// marked current.
    pub fn acquire(self: &Arc<Self>, reuse: bool) -> Result<Arc<TabWindow>> {
        if reuse {
            if let Some(current) = self.current.lock().upgrade() {
                if current.is_live() {
                    return Ok(current);
                }
            }
        }

        let window = TabWindow::create(self)?;
        let key = self.windows.write().insert(window.clone());
        *self.current.lock() = Arc::downgrade(&window);
        tracing::debug!(target: "figdock::pool", ?key, "window registered");
        self.window_created.emit(key);
        Ok(window)
    }

    /// Deregister a window that finished tearing down.
    ///
    /// Called from [`TabWindow::destroy`]; tolerates redundant calls.
    /// When the live set becomes empty outside an interactive session,
    /// the toolkit's event loop is asked to stop — the only place global
    /// shutdown is decided.
    pub(crate) fn forget(&self, window: &Arc<TabWindow>) {
        let key = {
            let windows = self.windows.read();
            windows
                .iter()
                .find(|(_, w)| Arc::ptr_eq(w, window))
                .map(|(key, _)| key)
        };
        let Some(key) = key else {
            return;
        };
        self.windows.write().remove(key);

        {
            let mut current = self.current.lock();
            if current.upgrade().is_some_and(|c| Arc::ptr_eq(&c, window)) {
                *current = Weak::new();
            }
        }

        tracing::debug!(target: "figdock::pool", ?key, "window deregistered");
        self.window_destroyed.emit(key);

        if self.windows.read().is_empty() && !self.toolkit.is_interactive() {
            tracing::debug!(target: "figdock::pool", "last window closed, stopping event loop");
            self.toolkit.stop_event_loop();
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The current default target for new figures, if still alive.
    pub fn current(&self) -> Option<Arc<TabWindow>> {
        self.current.lock().upgrade()
    }

    /// Number of live windows.
    pub fn window_count(&self) -> usize {
        self.windows.read().len()
    }

    /// Whether any windows are left.
    pub fn is_empty(&self) -> bool {
        self.windows.read().is_empty()
    }

    /// All live windows, in unspecified order.
    pub fn windows(&self) -> Vec<Arc<TabWindow>> {
        self.windows.read().values().cloned().collect()
    }

    /// The live window holding the given figure, if any.
    pub fn find_figure(&self, num: FigureId) -> Option<Arc<TabWindow>> {
        self.windows
            .read()
            .values()
            .find(|w| w.contains(num))
            .cloned()
    }
}

impl std::fmt::Debug for WindowPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowPool")
            .field("windows", &self.window_count())
            .field("has_current", &self.current().is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(WindowPool: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessCanvas, HeadlessToolkit, NullRegistry};

    fn pool_with_toolkit() -> (Arc<WindowPool>, Arc<HeadlessToolkit>) {
        let toolkit = HeadlessToolkit::new();
        let pool = WindowPool::new(toolkit.clone(), NullRegistry::new(), WindowConfig::default());
        (pool, toolkit)
    }

    fn manager(pool: &Arc<WindowPool>, num: u32, reuse: bool) -> Arc<ProxyManager> {
        pool.new_manager(
            FigureId(num),
            HeadlessCanvas::new(400, 300),
            NewFigureOptions {
                reuse_current_window: reuse,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_acquire_reuses_current() {
        let (pool, _toolkit) = pool_with_toolkit();
        let a = pool.acquire(true).unwrap();
        let b = pool.acquire(true).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.window_count(), 1);
    }

    #[test]
    fn test_acquire_without_reuse_creates_new() {
        let (pool, _toolkit) = pool_with_toolkit();
        let a = pool.acquire(true).unwrap();
        let b = pool.acquire(false).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(pool.window_count(), 2);
        // The new window became current.
        assert!(Arc::ptr_eq(&pool.current().unwrap(), &b));
    }

    #[test]
    fn test_dead_current_reads_as_absent() {
        let (pool, _toolkit) = pool_with_toolkit();
        let a = pool.acquire(true).unwrap();
        manager(&pool, 1, true);
        a.destroy();
        assert!(pool.current().is_none());

        let b = pool.acquire(true).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_figures_share_window_when_reusing() {
        let (pool, _toolkit) = pool_with_toolkit();
        manager(&pool, 1, true);
        manager(&pool, 2, true);
        manager(&pool, 3, true);

        assert_eq!(pool.window_count(), 1);
        let window = pool.current().unwrap();
        assert_eq!(window.figures(), vec![FigureId(1), FigureId(2), FigureId(3)]);
    }

    #[test]
    fn test_figure_per_window_when_not_reusing() {
        let (pool, _toolkit) = pool_with_toolkit();
        manager(&pool, 1, false);
        manager(&pool, 2, false);

        assert_eq!(pool.window_count(), 2);
    }

    #[test]
    fn test_duplicate_figure_id_rejected_pool_wide() {
        let (pool, _toolkit) = pool_with_toolkit();
        manager(&pool, 1, false);

        // Same id into a different window is still a duplicate.
        let err = pool
            .new_manager(
                FigureId(1),
                HeadlessCanvas::new(10, 10),
                NewFigureOptions::new_window(),
            )
            .unwrap_err();
        assert!(matches!(err, DockError::AlreadyManaged(FigureId(1))));
        assert_eq!(pool.window_count(), 1);
    }

    #[test]
    fn test_find_figure() {
        let (pool, _toolkit) = pool_with_toolkit();
        manager(&pool, 1, true);
        manager(&pool, 2, false);

        let w1 = pool.find_figure(FigureId(1)).unwrap();
        let w2 = pool.find_figure(FigureId(2)).unwrap();
        assert!(!Arc::ptr_eq(&w1, &w2));
        assert!(pool.find_figure(FigureId(3)).is_none());
    }

    #[test]
    fn test_stop_signaled_once_when_last_window_closes() {
        let (pool, toolkit) = pool_with_toolkit();
        let p1 = manager(&pool, 1, true);
        let p2 = manager(&pool, 2, false);

        p1.destroy().unwrap();
        assert_eq!(toolkit.stop_count(), 0);

        p2.destroy().unwrap();
        assert!(pool.is_empty());
        assert_eq!(toolkit.stop_count(), 1);
    }

    #[test]
    fn test_no_stop_in_interactive_session() {
        let toolkit = HeadlessToolkit::interactive();
        let pool = WindowPool::new(toolkit.clone(), NullRegistry::new(), WindowConfig::default());
        let p1 = pool
            .new_manager(
                FigureId(1),
                HeadlessCanvas::new(10, 10),
                NewFigureOptions::default(),
            )
            .unwrap();

        p1.destroy().unwrap();
        assert!(pool.is_empty());
        assert_eq!(toolkit.stop_count(), 0);
    }

    #[test]
    fn test_window_signals() {
        let (pool, _toolkit) = pool_with_toolkit();
        let created = Arc::new(Mutex::new(Vec::new()));
        let destroyed = Arc::new(Mutex::new(Vec::new()));
        let created2 = created.clone();
        let destroyed2 = destroyed.clone();
        pool.window_created.connect(move |key| created2.lock().push(*key));
        pool.window_destroyed
            .connect(move |key| destroyed2.lock().push(*key));

        let p1 = manager(&pool, 1, true);
        p1.destroy().unwrap();

        let created = created.lock().clone();
        assert_eq!(created.len(), 1);
        assert_eq!(*destroyed.lock(), created);
    }
}
