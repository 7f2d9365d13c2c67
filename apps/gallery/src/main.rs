mod components;

use log::{info, warn};
use viewkit_core::{DisplayTree, ResizeAwareComponent, ViewConfig};
use viewkit_platform_winit::run_winit_app;

use crate::components::{mount_component, ResizeCounter};

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "gallery.toml".to_string());
    let cfg = ViewConfig::load_or_default(&path)?;

    viewkit_modules_logging::init(&cfg.log_filter);
    info!(target: "gallery", "config='{}' components={}", path, cfg.components.len());

    let mut tree = DisplayTree::with_viewport(cfg.initial_viewport());
    for c in &cfg.components {
        mount_component(&mut tree, c)?;
    }

    if tree.is_empty() {
        warn!(target: "gallery", "no components configured; mounting a resize counter");
        tree.mount(Box::new(ResizeAwareComponent::new(ResizeCounter::new("default"))));
    }

    run_winit_app(tree, &cfg)?;
    Ok(())
}
