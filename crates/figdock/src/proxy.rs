//! The per-figure manager of record.
//!
//! External figure registries assume exactly one manager object per
//! figure and treat that object's destruction as "this figure is gone."
//! [`ProxyManager`] satisfies that contract while several figures share
//! one [`TabWindow`](crate::TabWindow): every manager call is translated
//! from "this whole manager" into "this one figure inside its window."
//!
//! The crux is [`destroy`](ProxyManager::destroy): invoked by the
//! registry, it removes exactly the proxy's own figure from its window —
//! never the window itself. The inverse hop is
//! [`destroy_figure`](ProxyManager::destroy_figure): the tab's close
//! control reports back to the registry, which does its bookkeeping and
//! routes the teardown into `destroy`.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::{DockError, Result};
use crate::figure::{Figure, FigureId};
use crate::window::TabWindow;

/// The external global figure registry, as seen by figdock.
///
/// One manager object is registered per figure number. figdock only ever
/// asks the registry to destroy a manager; the registry is expected to
/// unregister the figure and call [`ProxyManager::destroy`] in response.
pub trait FigureRegistry: Send + Sync {
    /// Destroy the manager of record for `num`.
    fn destroy_manager(&self, num: FigureId);
}

/// One figure's manager of record, delegating to the owning window.
///
/// Created by [`TabWindow::add_figure`] and alive for the whole lifetime
/// of its figure; the owner reference is re-pointed when the figure is
/// detached into another window, and cleared when the figure's tab is
/// removed so that later use fails with
/// [`DockError::StaleProxy`] instead of acting on a dead window.
pub struct ProxyManager {
    figure: Arc<Figure>,
    owner: Mutex<Weak<TabWindow>>,
    registry: Arc<dyn FigureRegistry>,
}

impl ProxyManager {
    pub(crate) fn new(figure: Arc<Figure>, registry: Arc<dyn FigureRegistry>) -> Arc<Self> {
        Arc::new(Self {
            figure,
            owner: Mutex::new(Weak::new()),
            registry,
        })
    }

    fn owner(&self) -> Result<Arc<TabWindow>> {
        self.owner
            .lock()
            .upgrade()
            .ok_or(DockError::StaleProxy(self.figure.num()))
    }

    pub(crate) fn set_owner(&self, owner: Weak<TabWindow>) {
        *self.owner.lock() = owner;
    }

    pub(crate) fn clear_owner(&self) {
        *self.owner.lock() = Weak::new();
    }

    /// The figure this proxy manages.
    pub fn figure(&self) -> &Arc<Figure> {
        &self.figure
    }

    /// The figure's numeric id.
    pub fn num(&self) -> FigureId {
        self.figure.num()
    }

    /// The window currently holding the figure, if any.
    pub fn window(&self) -> Option<Arc<TabWindow>> {
        self.owner.lock().upgrade()
    }

    /// Whether the figure currently has a tab in a live window.
    pub fn is_attached(&self) -> bool {
        self.window().is_some()
    }

    /// Activate this figure's tab and show the owning window.
    ///
    /// Sibling tabs are untouched beyond this figure becoming current.
    pub fn show(&self) -> Result<()> {
        let owner = self.owner()?;
        owner.set_active_figure(self.figure.num())?;
        owner.show();
        Ok(())
    }

    /// Registry-driven teardown: remove this one figure's tab.
    ///
    /// The owning window survives unless this was its last figure. After
    /// a successful call the proxy is detached; further figure-scoped
    /// operations fail with [`DockError::StaleProxy`].
    pub fn destroy(&self) -> Result<()> {
        let owner = self.owner()?;
        owner.remove_figure(self.figure.num())
    }

    /// Close-control path: ask the registry to tear this figure down.
    ///
    /// Teardown ordering must pass through the registry's bookkeeping,
    /// which routes back into [`destroy`](Self::destroy).
    pub fn destroy_figure(&self) {
        tracing::debug!(target: "figdock::proxy", figure = %self.figure.num(), "close requested");
        self.registry.destroy_manager(self.figure.num());
    }

    /// Resize the owning window.
    pub fn resize(&self, width: u32, height: u32) -> Result<()> {
        self.owner()?.resize(width, height);
        Ok(())
    }

    /// Toggle fullscreen on the owning window.
    pub fn full_screen_toggle(&self) -> Result<()> {
        self.owner()?.full_screen_toggle();
        Ok(())
    }

    /// This figure's title — the tab label, not the shared window title.
    pub fn window_title(&self) -> Result<String> {
        self.owner()?.figure_title(self.figure.num())
    }

    /// Retitle this figure's tab label.
    pub fn set_window_title(&self, title: &str) -> Result<()> {
        self.owner()?.set_figure_title(self.figure.num(), title)
    }

    /// Move the figure into a brand-new window; returns the new window.
    pub fn detach(&self) -> Result<Arc<TabWindow>> {
        self.owner()?.detach_figure(self.figure.num())
    }
}

impl std::fmt::Debug for ProxyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyManager")
            .field("figure", &self.figure.num())
            .field("attached", &self.is_attached())
            .finish()
    }
}

static_assertions::assert_impl_all!(ProxyManager: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessCanvas, HeadlessToolkit, NullRegistry};
    use crate::pool::{NewFigureOptions, WindowPool};
    use crate::toolkit::WindowConfig;

    fn pool() -> Arc<WindowPool> {
        WindowPool::new(
            HeadlessToolkit::new(),
            NullRegistry::new(),
            WindowConfig::default(),
        )
    }

    fn manager(pool: &Arc<WindowPool>, num: u32) -> Arc<ProxyManager> {
        pool.new_manager(
            FigureId(num),
            HeadlessCanvas::new(400, 300),
            NewFigureOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_destroy_removes_only_own_figure() {
        let pool = pool();
        let p1 = manager(&pool, 1);
        let p2 = manager(&pool, 2);
        let p3 = manager(&pool, 3);
        let window = p1.window().unwrap();
        assert_eq!(window.figure_count(), 3);

        p2.destroy().unwrap();

        assert_eq!(window.figures(), vec![FigureId(1), FigureId(3)]);
        assert!(window.is_live());
        // Siblings are still switchable.
        p1.show().unwrap();
        assert_eq!(window.active_figure(), Some(FigureId(1)));
        p3.show().unwrap();
        assert_eq!(window.active_figure(), Some(FigureId(3)));
    }

    #[test]
    fn test_destroyed_proxy_is_stale() {
        let pool = pool();
        let p1 = manager(&pool, 1);
        let p2 = manager(&pool, 2);

        p1.destroy().unwrap();
        assert!(!p1.is_attached());
        assert!(matches!(p1.show(), Err(DockError::StaleProxy(FigureId(1)))));
        assert!(matches!(p1.destroy(), Err(DockError::StaleProxy(_))));
        assert!(matches!(p1.resize(10, 10), Err(DockError::StaleProxy(_))));

        // The sibling proxy is unaffected.
        p2.show().unwrap();
    }

    #[test]
    fn test_titles_are_per_figure() {
        let pool = pool();
        let p1 = manager(&pool, 1);
        let p2 = manager(&pool, 2);

        p1.set_window_title("alpha").unwrap();
        p2.set_window_title("beta").unwrap();

        assert_eq!(p1.window_title().unwrap(), "alpha");
        assert_eq!(p2.window_title().unwrap(), "beta");
    }

    #[test]
    fn test_detach_via_proxy() {
        let pool = pool();
        let p1 = manager(&pool, 1);
        let p2 = manager(&pool, 2);
        let source = p1.window().unwrap();

        let new_window = p1.detach().unwrap();

        assert!(!Arc::ptr_eq(&source, &new_window));
        assert_eq!(p1.num(), FigureId(1));
        assert!(Arc::ptr_eq(&p1.window().unwrap(), &new_window));
        assert!(Arc::ptr_eq(&p2.window().unwrap(), &source));
        assert_eq!(pool.window_count(), 2);
    }

    #[test]
    fn test_show_activates_and_shows() {
        let pool = pool();
        let p1 = manager(&pool, 1);
        let _p2 = manager(&pool, 2);
        let window = p1.window().unwrap();
        assert_eq!(window.active_figure(), Some(FigureId(2)));

        p1.show().unwrap();
        assert_eq!(window.active_figure(), Some(FigureId(1)));
    }
}
