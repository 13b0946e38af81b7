//! The capability surface through which figdock drives the host toolkit.
//!
//! figdock does not render anything and does not own an event loop. The
//! hosting backend supplies implementations of these traits — thin wrappers
//! over its native window, tab container, canvas, and toolbar widgets —
//! and wires native callbacks (tab switch, close click, detach click,
//! window close) to the corresponding core methods. The core only ever
//! calls the narrow operations below.
//!
//! [`HeadlessToolkit`](crate::headless::HeadlessToolkit) provides a
//! display-free implementation for tests and embedding.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::figure::FigureId;

/// A non-fatal toolkit/widget failure.
///
/// Widget failures are either propagated as
/// [`DockError::WindowCreation`](crate::DockError::WindowCreation) (window
/// construction) or logged and swallowed (decorative resources such as
/// window icons).
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct WidgetError(String);

impl WidgetError {
    /// Create a widget error from a message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Opaque identifier for a tab inside a [`TabStrip`].
///
/// Assigned by the toolkit when a tab is appended and stable across
/// removal of sibling tabs (unlike a raw page index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub u64);

/// One figure's pixel surface, wrapped as a displayable widget.
///
/// The core never inspects canvas content; it only places the widget and
/// queries its natural size.
pub trait CanvasHandle: Send + Sync {
    /// Make the canvas widget visible.
    fn show(&self);
    /// Release the canvas widget.
    fn destroy(&self);
    /// Set the canvas size in pixels.
    fn resize(&self, width: u32, height: u32);
    /// Give the canvas keyboard focus.
    fn grab_focus(&self);
    /// The figure's natural size in pixels (its bbox).
    fn natural_size(&self) -> (u32, u32);
}

/// A top-level window.
pub trait WindowHandle: Send + Sync {
    /// Show the window.
    fn show(&self);
    /// Release the window and its widget tree.
    fn destroy(&self);
    /// Resize the window in pixels.
    fn resize(&self, width: u32, height: u32);
    /// Set the size the window opens with (may differ from a later resize).
    fn set_default_size(&self, width: u32, height: u32);
    /// Set the window title.
    fn set_title(&self, title: &str);
    /// The current window title.
    fn title(&self) -> String;
    /// Enter or leave fullscreen.
    fn set_fullscreen(&self, fullscreen: bool);
    /// Set the window icon from an image file.
    fn set_icon(&self, path: &Path) -> Result<(), WidgetError>;
}

/// The tab container inside a window.
pub trait TabStrip: Send + Sync {
    /// Append a tab holding `canvas`, labelled `title`, with the standard
    /// per-figure controls (close, detach). Returns the new tab's id.
    fn append_tab(&self, canvas: &Arc<dyn CanvasHandle>, title: &str) -> TabId;
    /// Make the given tab the visible page.
    fn select_tab(&self, tab: TabId);
    /// Remove the given tab. The canvas inside it is reparented out, not
    /// destroyed.
    fn remove_tab(&self, tab: TabId);
    /// Update a tab's label text.
    fn set_tab_title(&self, tab: TabId, title: &str);
    /// Number of tabs currently in the strip.
    fn tab_count(&self) -> usize;
}

/// The shared toolbar/tool-manager collaborator.
///
/// Tool state is owned entirely by the toolkit; the core only reports
/// which figure the tools should act on.
pub trait ToolHost: Send + Sync {
    /// Point the shared toolbar/statusbar at the given figure.
    fn set_figure(&self, num: FigureId);
}

/// The widget bundle backing one tab window.
pub struct WindowParts {
    /// The top-level window.
    pub window: Arc<dyn WindowHandle>,
    /// The tab container inside the window.
    pub tabs: Arc<dyn TabStrip>,
    /// The shared toolbar/statusbar collaborator.
    pub tools: Arc<dyn ToolHost>,
    /// Vertical overhead of the non-canvas chrome (tab strip, toolbar,
    /// statusbar), used when sizing the window around a canvas.
    pub chrome_height: u32,
}

impl fmt::Debug for WindowParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowParts")
            .field("chrome_height", &self.chrome_height)
            .finish()
    }
}

/// The toolkit itself: window factory plus event-loop control.
pub trait Toolkit: Send + Sync {
    /// Create a window with an empty tab strip and shared tool chrome.
    fn create_window(&self, config: &WindowConfig) -> Result<WindowParts, WidgetError>;
    /// Ask the event loop to stop. Called once when the last window closes
    /// in non-interactive mode.
    fn stop_event_loop(&self);
    /// Whether the host is in an interactive session (event loop outlives
    /// the windows).
    fn is_interactive(&self) -> bool;
}

/// Configuration for creating a tab window.
///
/// # Example
///
/// ```
/// use figdock::WindowConfig;
///
/// let config = WindowConfig::new("Figures")
///     .with_size(800, 600)
///     .with_icon("assets/figure.png");
/// ```
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Window title.
    title: String,
    /// Initial window size (width, height) in pixels.
    size: Option<(u32, u32)>,
    /// Window icon image file.
    icon: Option<PathBuf>,
}

impl WindowConfig {
    /// Create a configuration with the given window title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            size: None,
            icon: None,
        }
    }

    /// Set the initial window size in pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Set the window icon image file.
    pub fn with_icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.icon = Some(path.into());
        self
    }

    /// The configured window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The configured initial size, if any.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// The configured icon path, if any.
    pub fn icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("Figures")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_config_builder() {
        let config = WindowConfig::new("Plots")
            .with_size(1024, 768)
            .with_icon("icon.png");

        assert_eq!(config.title(), "Plots");
        assert_eq!(config.size(), Some((1024, 768)));
        assert_eq!(config.icon(), Some(Path::new("icon.png")));
    }

    #[test]
    fn test_window_config_defaults() {
        let config = WindowConfig::default();
        assert_eq!(config.title(), "Figures");
        assert_eq!(config.size(), None);
        assert!(config.icon().is_none());
    }
}
