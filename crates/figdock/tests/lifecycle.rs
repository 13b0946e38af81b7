//! End-to-end lifecycle scenarios against the headless toolkit, with a
//! registry that mirrors the external one-manager-per-figure contract:
//! the close control asks the registry to destroy the figure's manager,
//! and the registry routes that back into `ProxyManager::destroy`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use figdock::headless::{HeadlessCanvas, HeadlessToolkit};
use figdock::{FigureId, FigureRegistry, NewFigureOptions, ProxyManager, WindowConfig, WindowPool};

/// Minimal stand-in for the plotting library's global figure registry.
struct Registry {
    managers: Mutex<HashMap<FigureId, Arc<ProxyManager>>>,
}

impl Registry {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            managers: Mutex::new(HashMap::new()),
        })
    }

    fn track(&self, proxy: &Arc<ProxyManager>) {
        self.managers.lock().insert(proxy.num(), proxy.clone());
    }

    fn contains(&self, num: FigureId) -> bool {
        self.managers.lock().contains_key(&num)
    }

    fn len(&self) -> usize {
        self.managers.lock().len()
    }
}

impl FigureRegistry for Registry {
    fn destroy_manager(&self, num: FigureId) {
        // Registry bookkeeping first, then the manager teardown, matching
        // the external registry's destroy ordering.
        let proxy = self.managers.lock().remove(&num);
        if let Some(proxy) = proxy {
            proxy.destroy().unwrap();
        }
    }
}

struct Session {
    toolkit: Arc<HeadlessToolkit>,
    registry: Arc<Registry>,
    pool: Arc<WindowPool>,
}

impl Session {
    fn new() -> Self {
        let toolkit = HeadlessToolkit::new();
        let registry = Registry::new();
        let pool = WindowPool::new(
            toolkit.clone(),
            registry.clone(),
            WindowConfig::default(),
        );
        Self {
            toolkit,
            registry,
            pool,
        }
    }

    fn new_figure(&self, num: u32, reuse: bool) -> Arc<ProxyManager> {
        let proxy = self
            .pool
            .new_manager(
                FigureId(num),
                HeadlessCanvas::new(640, 480),
                NewFigureOptions {
                    reuse_current_window: reuse,
                },
            )
            .unwrap();
        self.registry.track(&proxy);
        proxy
    }
}

#[test]
fn three_figures_detach_and_close_down_to_one_window() {
    let session = Session::new();

    // Create figures 1, 2, 3 into one window.
    let f1 = session.new_figure(1, true);
    let f2 = session.new_figure(2, true);
    let f3 = session.new_figure(3, true);

    let window_a = f1.window().unwrap();
    assert_eq!(session.pool.window_count(), 1);
    assert_eq!(window_a.figures(), vec![FigureId(1), FigureId(2), FigureId(3)]);
    assert_eq!(window_a.active_figure(), Some(FigureId(3)));

    // Detach figure 1 into its own window.
    let window_b = f1.detach().unwrap();
    assert_eq!(session.pool.window_count(), 2);
    assert_eq!(window_a.figures(), vec![FigureId(2), FigureId(3)]);
    assert_eq!(window_a.active_figure(), Some(FigureId(3)));
    assert_eq!(window_b.figures(), vec![FigureId(1)]);
    assert_eq!(window_b.active_figure(), Some(FigureId(1)));
    assert_eq!(f1.num(), FigureId(1));

    // Close figure 2 through its tab's close control.
    f2.destroy_figure();
    assert_eq!(window_a.figures(), vec![FigureId(3)]);
    assert!(!session.registry.contains(FigureId(2)));
    assert_eq!(session.pool.window_count(), 2);

    // Close figure 3: window A goes down, only window B remains.
    f3.destroy_figure();
    assert!(!window_a.is_live());
    assert_eq!(session.pool.window_count(), 1);
    assert!(Arc::ptr_eq(&session.pool.windows()[0], &window_b));

    // A window is still open, so the event loop keeps running.
    assert_eq!(session.toolkit.stop_count(), 0);
}

#[test]
fn closing_the_last_figure_stops_the_event_loop_once() {
    let session = Session::new();
    let f1 = session.new_figure(1, true);
    let window = f1.window().unwrap();

    f1.destroy_figure();

    assert_eq!(window.figure_count(), 0);
    assert!(!window.is_live());
    assert!(session.pool.is_empty());
    assert_eq!(session.registry.len(), 0);
    assert_eq!(session.toolkit.stop_count(), 1);
}

#[test]
fn detaching_the_only_figure_never_drains_the_pool() {
    let session = Session::new();
    let f1 = session.new_figure(1, true);
    let source = f1.window().unwrap();

    let target = f1.detach().unwrap();

    // The source window died with its last figure, the figure lives on in
    // the new window, and no shutdown was signaled along the way.
    assert!(!source.is_live());
    assert_eq!(session.pool.window_count(), 1);
    assert_eq!(target.figures(), vec![FigureId(1)]);
    assert_eq!(session.toolkit.stop_count(), 0);
}

#[test]
fn registry_destroy_reaches_exactly_one_tab() {
    let session = Session::new();
    let _f1 = session.new_figure(1, true);
    let f2 = session.new_figure(2, true);
    let f3 = session.new_figure(3, true);
    let window = f2.window().unwrap();

    // Registry-driven destroy (e.g. pyplot close(2)).
    session.registry.destroy_manager(FigureId(2));

    assert_eq!(window.figures(), vec![FigureId(1), FigureId(3)]);
    assert!(window.is_live());
    assert!(matches!(f2.destroy(), Err(figdock::DockError::StaleProxy(_))));

    // Remaining figures still switch normally.
    f3.show().unwrap();
    assert_eq!(window.active_figure(), Some(FigureId(3)));
}

#[test]
fn active_figure_stays_a_member_through_churn() {
    let session = Session::new();
    let proxies: Vec<_> = (1..=5).map(|n| session.new_figure(n, true)).collect();
    let window = proxies[0].window().unwrap();

    let check = |window: &Arc<figdock::TabWindow>| {
        if let Some(active) = window.active_figure() {
            assert!(window.contains(active));
        }
    };

    window.set_active_figure(FigureId(2)).unwrap();
    check(&window);
    proxies[3].destroy_figure(); // remove figure 4
    check(&window);
    proxies[1].destroy_figure(); // remove the active figure 2
    assert_eq!(window.active_figure(), None);
    window.set_active_figure(FigureId(5)).unwrap();
    check(&window);
    assert_eq!(window.figures(), vec![FigureId(1), FigureId(3), FigureId(5)]);
}

#[test]
fn figure_numbers_survive_repeated_detach() {
    let session = Session::new();
    let f1 = session.new_figure(42, true);
    let _f2 = session.new_figure(43, true);

    let w1 = f1.detach().unwrap();
    let w2 = f1.detach().unwrap();

    assert_eq!(f1.num(), FigureId(42));
    assert!(!w1.is_live());
    assert_eq!(w2.figures(), vec![FigureId(42)]);
    assert_eq!(w2.figure_title(FigureId(42)).unwrap(), "Fig 42");
    assert_eq!(session.pool.window_count(), 2);
}
