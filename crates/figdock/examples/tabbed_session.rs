//! A plotting-session walkthrough against the headless toolkit: three
//! figures share one window, one gets detached, one gets closed.
//!
//! Run with `RUST_LOG=figdock=debug` to watch the lifecycle decisions.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use figdock::headless::{HeadlessCanvas, HeadlessToolkit};
use figdock::{FigureId, FigureRegistry, NewFigureOptions, ProxyManager, WindowConfig, WindowPool};

/// The hosting library's global figure registry, reduced to the part
/// figdock interacts with: one manager of record per figure number.
#[derive(Default)]
struct Registry {
    managers: Mutex<HashMap<FigureId, Arc<ProxyManager>>>,
}

impl FigureRegistry for Registry {
    fn destroy_manager(&self, num: FigureId) {
        if let Some(proxy) = self.managers.lock().remove(&num) {
            proxy.destroy().expect("figure still managed");
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let toolkit = HeadlessToolkit::new();
    let registry = Arc::new(Registry::default());
    let pool = WindowPool::new(toolkit.clone(), registry.clone(), WindowConfig::default());

    // figure(); figure(); figure() — all tabs of one window.
    for num in 1..=3 {
        let proxy = pool
            .new_manager(
                FigureId(num),
                HeadlessCanvas::new(640, 480),
                NewFigureOptions::default(),
            )
            .expect("fresh figure number");
        registry.managers.lock().insert(proxy.num(), proxy);
    }
    report(&pool, "after creating figures 1..3");

    // fig1.canvas.manager.detach()
    let fig1 = registry.managers.lock()[&FigureId(1)].clone();
    fig1.detach().expect("figure 1 is managed");
    report(&pool, "after detaching figure 1");

    // User clicks the close control on figure 2's tab.
    let fig2 = registry.managers.lock()[&FigureId(2)].clone();
    fig2.destroy_figure();
    report(&pool, "after closing figure 2");

    println!(
        "event loop stop requests so far: {}",
        toolkit.stop_count()
    );
}

fn report(pool: &Arc<WindowPool>, label: &str) {
    println!("{label}:");
    for window in pool.windows() {
        println!(
            "  window with tabs {:?}, active {:?}",
            window.figures(),
            window.active_figure()
        );
    }
}
