//! The tab window manager.
//!
//! A [`TabWindow`] owns one top-level window holding a tab container;
//! each tab holds one figure's canvas plus its label and per-figure
//! controls. The manager tracks which figure is active, handles
//! add/remove/detach, and tears the window down when the last figure
//! leaves.
//!
//! # Lifecycle
//!
//! A window starts `Empty` right after construction, becomes `Populated`
//! on the first [`add_figure`](TabWindow::add_figure), and transitions
//! through `TearingDown` to `Destroyed` when the last figure is removed
//! or [`destroy`](TabWindow::destroy) is called directly. Teardown is
//! phase-guarded: removing a figure from inside a cascading teardown
//! never re-enters removal for entries that are already gone.
//!
//! # Locking
//!
//! All bookkeeping lives behind one mutex, which is released before any
//! toolkit call or signal emission. Toolkit callbacks (tab switch, close
//! click) may synchronously re-enter core methods, so no core operation
//! holds the state lock across an external call.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::{DockError, Result};
use crate::figure::{Figure, FigureId};
use crate::pool::WindowPool;
use crate::proxy::{FigureRegistry, ProxyManager};
use crate::signal::Signal;
use crate::toolkit::{TabId, WindowParts};

/// Teardown phases of a tab window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Constructed, no figures yet.
    Empty,
    /// At least one figure present.
    Populated,
    /// Cascading teardown in progress.
    TearingDown,
    /// Window released; no further operations accepted.
    Destroyed,
}

/// Per-figure bookkeeping inside a window.
struct TabEntry {
    figure: Arc<Figure>,
    /// The tab label text ("Fig {num}" unless retitled).
    title: String,
    tab: TabId,
    /// The figure's manager of record, re-pointed on detach.
    proxy: Weak<ProxyManager>,
}

struct TabState {
    /// Entries in tab order.
    entries: Vec<TabEntry>,
    active: Option<FigureId>,
    phase: Phase,
    fullscreen: bool,
}

impl TabState {
    fn index_of(&self, num: FigureId) -> Option<usize> {
        self.entries.iter().position(|e| e.figure.num() == num)
    }
}

/// A window presenting several figures as tabs.
///
/// Created on demand by the [`WindowPool`]; destroyed when its last
/// figure is removed or on explicit [`destroy`](Self::destroy).
///
/// # Signals
///
/// - [`figure_added`](Self::figure_added)`(FigureId)`
/// - [`figure_removed`](Self::figure_removed)`(FigureId)`
/// - [`active_changed`](Self::active_changed)`(FigureId)`
pub struct TabWindow {
    parts: WindowParts,
    registry: Arc<dyn FigureRegistry>,
    pool: Weak<WindowPool>,
    state: Mutex<TabState>,
    /// Emitted after a figure's tab has been created.
    pub figure_added: Signal<FigureId>,
    /// Emitted after a figure's tab has been removed.
    pub figure_removed: Signal<FigureId>,
    /// Emitted when a different figure becomes active.
    pub active_changed: Signal<FigureId>,
}

impl TabWindow {
    /// Build a window from the pool's toolkit and configuration.
    pub(crate) fn create(pool: &Arc<WindowPool>) -> Result<Arc<Self>> {
        let config = pool.window_config();
        let parts = pool.toolkit().create_window(config)?;

        // Icon trouble is cosmetic; continue with the toolkit default.
        if let Some(icon) = config.icon() {
            if let Err(err) = parts.window.set_icon(icon) {
                tracing::warn!(target: "figdock::window", error = %err, "could not load window icon");
            }
        }
        if let Some((width, height)) = config.size() {
            parts.window.set_default_size(width, height);
        }

        Ok(Arc::new(Self {
            parts,
            registry: pool.registry().clone(),
            pool: Arc::downgrade(pool),
            state: Mutex::new(TabState {
                entries: Vec::new(),
                active: None,
                phase: Phase::Empty,
                fullscreen: false,
            }),
            figure_added: Signal::new(),
            figure_removed: Signal::new(),
            active_changed: Signal::new(),
        }))
    }

    // =========================================================================
    // Figure management
    // =========================================================================

    /// Add a figure to this window and create its manager of record.
    ///
    /// The figure gets a new tab labelled `"Fig {num}"`, becomes the
    /// active figure, and the window is sized to the canvas's natural
    /// size plus the chrome overhead.
    ///
    /// # Errors
    ///
    /// [`DockError::AlreadyManaged`] if the figure already has a tab
    /// here; [`DockError::WindowTornDown`] if the window is shutting
    /// down.
    pub fn add_figure(self: &Arc<Self>, figure: Arc<Figure>) -> Result<Arc<ProxyManager>> {
        let proxy = ProxyManager::new(figure.clone(), self.registry.clone());
        self.attach(figure, proxy.clone())?;
        Ok(proxy)
    }

    /// Attach a figure whose proxy already exists (detach path).
    pub(crate) fn attach(self: &Arc<Self>, figure: Arc<Figure>, proxy: Arc<ProxyManager>) -> Result<()> {
        let num = figure.num();
        {
            let state = self.state.lock();
            if matches!(state.phase, Phase::TearingDown | Phase::Destroyed) {
                return Err(DockError::WindowTornDown);
            }
            if state.index_of(num).is_some() {
                return Err(DockError::AlreadyManaged(num));
            }
        }

        let title = format!("Fig {num}");
        let tab = self.parts.tabs.append_tab(figure.canvas(), &title);
        figure.canvas().show();
        let (width, height) = figure.canvas().natural_size();

        {
            let mut state = self.state.lock();
            state.entries.push(TabEntry {
                figure: figure.clone(),
                title,
                tab,
                proxy: Arc::downgrade(&proxy),
            });
            state.phase = Phase::Populated;
        }
        proxy.set_owner(Arc::downgrade(self));

        tracing::debug!(target: "figdock::window", figure = %num, "figure added");
        self.figure_added.emit(num);
        self.set_active_figure(num)?;
        self.parts
            .window
            .set_default_size(width, self.parts.chrome_height + height);
        Ok(())
    }

    /// Make the given figure the active (visible) one.
    ///
    /// Selecting an already-active figure is a no-op: the tool layer is
    /// not re-notified, so the direct-call path and the toolkit's
    /// tab-switch callback converge without feedback loops.
    ///
    /// # Errors
    ///
    /// [`DockError::NotManaged`] if the figure has no tab here.
    pub fn set_active_figure(&self, num: FigureId) -> Result<()> {
        let (tab, canvas) = {
            let mut state = self.state.lock();
            let idx = state.index_of(num).ok_or(DockError::NotManaged(num))?;
            if state.active == Some(num) {
                return Ok(());
            }
            state.active = Some(num);
            let entry = &state.entries[idx];
            (entry.tab, entry.figure.canvas().clone())
        };

        self.parts.tabs.select_tab(tab);
        self.parts.tools.set_figure(num);
        canvas.grab_focus();
        self.active_changed.emit(num);
        Ok(())
    }

    /// Remove a figure's tab and destroy its canvas widget.
    ///
    /// If the removed figure was active, no figure is active until the
    /// next `set_active_figure`/`add_figure`. Removing the last figure
    /// tears the window down.
    ///
    /// # Errors
    ///
    /// [`DockError::NotManaged`] if the figure has no tab here.
    pub fn remove_figure(self: &Arc<Self>, num: FigureId) -> Result<()> {
        self.remove_figure_inner(num, true)
    }

    fn remove_figure_inner(self: &Arc<Self>, num: FigureId, destroy_canvas: bool) -> Result<()> {
        let (entry, now_empty, tearing_down) = {
            let mut state = self.state.lock();
            let idx = state.index_of(num).ok_or(DockError::NotManaged(num))?;
            let entry = state.entries.remove(idx);
            if state.active == Some(num) {
                state.active = None;
            }
            (
                entry,
                state.entries.is_empty(),
                state.phase == Phase::TearingDown,
            )
        };

        self.parts.tabs.remove_tab(entry.tab);
        if destroy_canvas {
            entry.figure.canvas().destroy();
        }
        if let Some(proxy) = entry.proxy.upgrade() {
            proxy.clear_owner();
        }

        tracing::debug!(target: "figdock::window", figure = %num, "figure removed");
        self.figure_removed.emit(num);

        if now_empty && !tearing_down {
            self.destroy();
        }
        Ok(())
    }

    /// Move a figure out of this window into a brand-new one.
    ///
    /// The figure keeps its numeric id and its proxy manager; the proxy
    /// is re-pointed at the new window, which is shown and returned.
    /// The replacement window is acquired before the figure leaves this
    /// one, so the pool never looks empty mid-move even when detaching
    /// the only figure of the only window.
    ///
    /// # Errors
    ///
    /// [`DockError::NotManaged`] if the figure has no tab here;
    /// [`DockError::PoolGone`] if the owning pool has been dropped.
    pub fn detach_figure(self: &Arc<Self>, num: FigureId) -> Result<Arc<TabWindow>> {
        let (figure, proxy) = {
            let state = self.state.lock();
            let idx = state.index_of(num).ok_or(DockError::NotManaged(num))?;
            let entry = &state.entries[idx];
            (entry.figure.clone(), entry.proxy.clone())
        };
        let pool = self.pool.upgrade().ok_or(DockError::PoolGone)?;

        // Detach always produces a new top-level window.
        let target = pool.acquire(false)?;
        self.remove_figure_inner(num, false)?;
        match proxy.upgrade() {
            Some(proxy) => target.attach(figure, proxy)?,
            // Manager of record already dropped by the host; give the
            // figure a fresh one.
            None => {
                target.add_figure(figure)?;
            }
        }
        target.show();

        tracing::debug!(target: "figdock::window", figure = %num, "figure detached");
        Ok(target)
    }

    /// Tear down every remaining tab, release the window, and deregister
    /// from the pool.
    ///
    /// Safe to call redundantly; teardown runs at most once.
    pub fn destroy(self: &Arc<Self>) {
        let nums: Vec<FigureId> = {
            let mut state = self.state.lock();
            if matches!(state.phase, Phase::TearingDown | Phase::Destroyed) {
                return;
            }
            state.phase = Phase::TearingDown;
            state.entries.iter().map(|e| e.figure.num()).collect()
        };

        for num in nums {
            // A slot may already be gone if removal cascaded; skip it.
            let _ = self.remove_figure(num);
        }

        {
            let mut state = self.state.lock();
            state.active = None;
            state.phase = Phase::Destroyed;
        }
        self.parts.window.destroy();
        tracing::debug!(target: "figdock::window", "window destroyed");

        if let Some(pool) = self.pool.upgrade() {
            pool.forget(self);
        }
    }

    // =========================================================================
    // Window-scoped operations
    // =========================================================================

    /// Show the window.
    pub fn show(&self) {
        self.parts.window.show();
    }

    /// Resize the window in pixels.
    pub fn resize(&self, width: u32, height: u32) {
        self.parts.window.resize(width, height);
    }

    /// Toggle fullscreen. The flag is per-window, shared by all tabs.
    pub fn full_screen_toggle(&self) {
        let fullscreen = {
            let mut state = self.state.lock();
            state.fullscreen = !state.fullscreen;
            state.fullscreen
        };
        self.parts.window.set_fullscreen(fullscreen);
    }

    /// The shared window title.
    pub fn window_title(&self) -> String {
        self.parts.window.title()
    }

    /// Set the shared window title (not any tab label).
    pub fn set_window_title(&self, title: &str) {
        self.parts.window.set_title(title);
    }

    /// A figure's tab label text.
    pub fn figure_title(&self, num: FigureId) -> Result<String> {
        let state = self.state.lock();
        let idx = state.index_of(num).ok_or(DockError::NotManaged(num))?;
        Ok(state.entries[idx].title.clone())
    }

    /// Set a figure's tab label text.
    pub fn set_figure_title(&self, num: FigureId, title: &str) -> Result<()> {
        let tab = {
            let mut state = self.state.lock();
            let idx = state.index_of(num).ok_or(DockError::NotManaged(num))?;
            state.entries[idx].title = title.to_string();
            state.entries[idx].tab
        };
        self.parts.tabs.set_tab_title(tab, title);
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The currently active figure, if any.
    pub fn active_figure(&self) -> Option<FigureId> {
        self.state.lock().active
    }

    /// Number of figures in this window.
    pub fn figure_count(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether the given figure has a tab here.
    pub fn contains(&self, num: FigureId) -> bool {
        self.state.lock().index_of(num).is_some()
    }

    /// All managed figure ids, in tab order.
    pub fn figures(&self) -> Vec<FigureId> {
        self.state
            .lock()
            .entries
            .iter()
            .map(|e| e.figure.num())
            .collect()
    }

    /// Whether the window still accepts figures (not tearing down).
    pub fn is_live(&self) -> bool {
        matches!(self.state.lock().phase, Phase::Empty | Phase::Populated)
    }
}

impl std::fmt::Debug for TabWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TabWindow")
            .field("figures", &state.entries.len())
            .field("active", &state.active)
            .field("phase", &state.phase)
            .finish()
    }
}

static_assertions::assert_impl_all!(TabWindow: Send, Sync);
