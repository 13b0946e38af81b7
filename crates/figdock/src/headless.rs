//! Display-free toolkit implementation.
//!
//! [`HeadlessToolkit`] satisfies the full [`Toolkit`](crate::toolkit)
//! capability surface without a display server. Every widget operation is
//! recorded into a shared [`Journal`] so tests can assert on the exact
//! sequence of toolkit calls the core performed (tab appended, tool host
//! notified, event loop stopped, ...).
//!
//! This is the backend used by the crate's own tests and by the
//! `tabbed_session` example; embedders can also use it to drive figure
//! bookkeeping in environments without a GUI.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::figure::FigureId;
use crate::proxy::FigureRegistry;
use crate::toolkit::{
    CanvasHandle, TabId, TabStrip, ToolHost, Toolkit, WidgetError, WindowConfig, WindowHandle,
    WindowParts,
};

/// One recorded toolkit operation.
///
/// `window` is a serial number identifying which headless window the
/// operation targeted, in creation order starting from 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolkitOp {
    /// A window was created.
    WindowCreated { window: u64 },
    /// A window was shown.
    WindowShown { window: u64 },
    /// A window was destroyed.
    WindowDestroyed { window: u64 },
    /// A window was resized.
    WindowResized { window: u64, width: u32, height: u32 },
    /// A window's default (open) size was set.
    DefaultSizeSet { window: u64, width: u32, height: u32 },
    /// A window's title changed.
    TitleSet { window: u64, title: String },
    /// A window entered or left fullscreen.
    FullscreenSet { window: u64, fullscreen: bool },
    /// A window icon was applied.
    IconSet { window: u64 },
    /// A tab was appended to a window's tab strip.
    TabAppended { window: u64, tab: TabId, title: String },
    /// A tab became the visible page.
    TabSelected { window: u64, tab: TabId },
    /// A tab was removed.
    TabRemoved { window: u64, tab: TabId },
    /// A tab's label changed.
    TabTitleSet { window: u64, tab: TabId, title: String },
    /// The shared tool host was pointed at a figure.
    ToolFigureSet { window: u64, num: FigureId },
    /// The event loop was asked to stop.
    EventLoopStopped,
}

/// Shared journal of toolkit operations, in call order.
#[derive(Debug, Default)]
pub struct Journal {
    ops: Mutex<Vec<ToolkitOp>>,
}

impl Journal {
    fn record(&self, op: ToolkitOp) {
        self.ops.lock().push(op);
    }

    /// Snapshot of all recorded operations.
    pub fn ops(&self) -> Vec<ToolkitOp> {
        self.ops.lock().clone()
    }

    /// Count operations matching a predicate.
    pub fn count(&self, predicate: impl Fn(&ToolkitOp) -> bool) -> usize {
        self.ops.lock().iter().filter(|op| predicate(op)).count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.ops.lock().clear();
    }
}

/// A [`Toolkit`] that records instead of rendering.
pub struct HeadlessToolkit {
    interactive: bool,
    fail_icons: bool,
    journal: Arc<Journal>,
    next_window: AtomicU64,
    next_tab: Arc<AtomicU64>,
}

impl HeadlessToolkit {
    /// Chrome overhead reported for every headless window.
    pub const CHROME_HEIGHT: u32 = 96;

    /// Create a non-interactive headless toolkit.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            interactive: false,
            fail_icons: false,
            journal: Arc::new(Journal::default()),
            next_window: AtomicU64::new(0),
            next_tab: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Create a toolkit reporting an interactive session.
    pub fn interactive() -> Arc<Self> {
        Arc::new(Self {
            interactive: true,
            ..Self::unwrapped()
        })
    }

    /// Create a toolkit whose windows reject icon files, to exercise the
    /// degraded-icon path.
    pub fn failing_icons() -> Arc<Self> {
        Arc::new(Self {
            fail_icons: true,
            ..Self::unwrapped()
        })
    }

    fn unwrapped() -> Self {
        Self {
            interactive: false,
            fail_icons: false,
            journal: Arc::new(Journal::default()),
            next_window: AtomicU64::new(0),
            next_tab: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The shared operation journal.
    pub fn journal(&self) -> &Arc<Journal> {
        &self.journal
    }

    /// How many times the event loop was asked to stop.
    pub fn stop_count(&self) -> usize {
        self.journal
            .count(|op| matches!(op, ToolkitOp::EventLoopStopped))
    }
}

impl Toolkit for HeadlessToolkit {
    fn create_window(&self, config: &WindowConfig) -> Result<WindowParts, WidgetError> {
        let id = self.next_window.fetch_add(1, Ordering::SeqCst);
        self.journal.record(ToolkitOp::WindowCreated { window: id });

        let window = Arc::new(HeadlessWindow {
            id,
            title: Mutex::new(config.title().to_string()),
            fail_icons: self.fail_icons,
            journal: self.journal.clone(),
        });
        let tabs = Arc::new(HeadlessTabStrip {
            window: id,
            tabs: Mutex::new(Vec::new()),
            next_tab: self.next_tab.clone(),
            journal: self.journal.clone(),
        });
        let tools = Arc::new(HeadlessToolHost {
            window: id,
            journal: self.journal.clone(),
        });

        Ok(WindowParts {
            window,
            tabs,
            tools,
            chrome_height: Self::CHROME_HEIGHT,
        })
    }

    fn stop_event_loop(&self) {
        self.journal.record(ToolkitOp::EventLoopStopped);
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

struct HeadlessWindow {
    id: u64,
    title: Mutex<String>,
    fail_icons: bool,
    journal: Arc<Journal>,
}

impl WindowHandle for HeadlessWindow {
    fn show(&self) {
        self.journal.record(ToolkitOp::WindowShown { window: self.id });
    }

    fn destroy(&self) {
        self.journal
            .record(ToolkitOp::WindowDestroyed { window: self.id });
    }

    fn resize(&self, width: u32, height: u32) {
        self.journal.record(ToolkitOp::WindowResized {
            window: self.id,
            width,
            height,
        });
    }

    fn set_default_size(&self, width: u32, height: u32) {
        self.journal.record(ToolkitOp::DefaultSizeSet {
            window: self.id,
            width,
            height,
        });
    }

    fn set_title(&self, title: &str) {
        *self.title.lock() = title.to_string();
        self.journal.record(ToolkitOp::TitleSet {
            window: self.id,
            title: title.to_string(),
        });
    }

    fn title(&self) -> String {
        self.title.lock().clone()
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        self.journal.record(ToolkitOp::FullscreenSet {
            window: self.id,
            fullscreen,
        });
    }

    fn set_icon(&self, path: &Path) -> Result<(), WidgetError> {
        if self.fail_icons {
            return Err(WidgetError::new(format!(
                "cannot decode icon {}",
                path.display()
            )));
        }
        self.journal.record(ToolkitOp::IconSet { window: self.id });
        Ok(())
    }
}

struct HeadlessTabStrip {
    window: u64,
    tabs: Mutex<Vec<TabId>>,
    next_tab: Arc<AtomicU64>,
    journal: Arc<Journal>,
}

impl TabStrip for HeadlessTabStrip {
    fn append_tab(&self, _canvas: &Arc<dyn CanvasHandle>, title: &str) -> TabId {
        let tab = TabId(self.next_tab.fetch_add(1, Ordering::SeqCst));
        self.tabs.lock().push(tab);
        self.journal.record(ToolkitOp::TabAppended {
            window: self.window,
            tab,
            title: title.to_string(),
        });
        tab
    }

    fn select_tab(&self, tab: TabId) {
        self.journal.record(ToolkitOp::TabSelected {
            window: self.window,
            tab,
        });
    }

    fn remove_tab(&self, tab: TabId) {
        self.tabs.lock().retain(|t| *t != tab);
        self.journal.record(ToolkitOp::TabRemoved {
            window: self.window,
            tab,
        });
    }

    fn set_tab_title(&self, tab: TabId, title: &str) {
        self.journal.record(ToolkitOp::TabTitleSet {
            window: self.window,
            tab,
            title: title.to_string(),
        });
    }

    fn tab_count(&self) -> usize {
        self.tabs.lock().len()
    }
}

struct HeadlessToolHost {
    window: u64,
    journal: Arc<Journal>,
}

impl ToolHost for HeadlessToolHost {
    fn set_figure(&self, num: FigureId) {
        self.journal.record(ToolkitOp::ToolFigureSet {
            window: self.window,
            num,
        });
    }
}

/// A canvas that tracks its own lifecycle instead of drawing.
pub struct HeadlessCanvas {
    size: Mutex<(u32, u32)>,
    shown: AtomicUsize,
    focused: AtomicUsize,
    destroyed: AtomicBool,
}

impl HeadlessCanvas {
    /// Create a canvas with the given natural size in pixels.
    pub fn new(width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self {
            size: Mutex::new((width, height)),
            shown: AtomicUsize::new(0),
            focused: AtomicUsize::new(0),
            destroyed: AtomicBool::new(false),
        })
    }

    /// Whether the canvas widget has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// How many times the canvas was shown.
    pub fn show_count(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    /// How many times the canvas grabbed focus.
    pub fn focus_count(&self) -> usize {
        self.focused.load(Ordering::SeqCst)
    }
}

impl CanvasHandle for HeadlessCanvas {
    fn show(&self) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    fn resize(&self, width: u32, height: u32) {
        *self.size.lock() = (width, height);
    }

    fn grab_focus(&self) {
        self.focused.fetch_add(1, Ordering::SeqCst);
    }

    fn natural_size(&self) -> (u32, u32) {
        *self.size.lock()
    }
}

/// A figure registry that records nothing and routes nothing.
///
/// For tests and demos that do not exercise the registry round trip.
pub struct NullRegistry;

impl NullRegistry {
    /// Create a null registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl FigureRegistry for NullRegistry {
    fn destroy_manager(&self, num: FigureId) {
        tracing::trace!(target: "figdock::headless", figure = %num, "null registry ignoring destroy");
    }
}
