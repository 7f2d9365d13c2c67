use log::{debug, info};
use viewkit_core::{
    Component, ComponentConfig, DisplayTree, MountCtx, NodeId, ReactiveBuilder, RenderCtx,
    ResizeAware, ResizeAwareComponent, ViewError, ViewResult, ViewportSize,
};

const DEFAULT_COLLAPSE_BELOW: u32 = 960;

/// Navigation pane that collapses on narrow viewports.
pub struct Sidebar {
    name: String,
    collapse_below: u32,
    collapsed: bool,
    dirty: bool,
}

impl Sidebar {
    pub fn new(name: impl Into<String>, collapse_below: u32) -> Self {
        Self {
            name: name.into(),
            collapse_below,
            collapsed: false,
            dirty: true,
        }
    }

    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    fn apply(&mut self, size: ViewportSize) {
        let collapsed = size.width < self.collapse_below;
        if collapsed != self.collapsed {
            self.collapsed = collapsed;
            self.dirty = true;
        }
    }
}

impl Component for Sidebar {
    fn id(&self) -> &'static str {
        "sidebar"
    }

    fn on_mount(&mut self, ctx: &mut MountCtx<'_>) {
        self.apply(ctx.viewport());
    }

    fn render(&mut self, ctx: &RenderCtx) -> ViewResult<()> {
        if self.dirty {
            self.dirty = false;
            info!(
                target: "gallery",
                "{} pass={} width={} collapsed={}",
                self.name,
                ctx.pass,
                ctx.viewport.width,
                self.collapsed
            );
        }
        Ok(())
    }
}

impl ResizeAware for Sidebar {
    fn window_resize_handler(&mut self, size: ViewportSize) {
        self.apply(size);
    }
}

/// Counts resize events seen while mounted.
pub struct ResizeCounter {
    name: String,
    hits: u64,
}

impl ResizeCounter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hits: 0,
        }
    }

    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits
    }
}

impl Component for ResizeCounter {
    fn id(&self) -> &'static str {
        "counter"
    }

    fn on_unmount(&mut self) {
        info!(target: "gallery", "{} saw {} resize events", self.name, self.hits());
    }
}

impl ResizeAware for ResizeCounter {
    fn window_resize_handler(&mut self, size: ViewportSize) {
        self.hits += 1;
        debug!(
            target: "gallery",
            "{} resize #{} {}x{}",
            self.name,
            self.hits,
            size.width,
            size.height
        );
    }
}

#[derive(Debug, Default)]
pub struct StatusLine {
    pub last: Option<ViewportSize>,
}

/// Build a component from its config entry and mount it.
pub fn mount_component(tree: &mut DisplayTree, cfg: &ComponentConfig) -> ViewResult<NodeId> {
    let id = match cfg.kind.as_str() {
        "sidebar" => {
            let below = cfg
                .data_u32("collapse_below")
                .unwrap_or(DEFAULT_COLLAPSE_BELOW);
            tree.mount(Box::new(ResizeAwareComponent::new(Sidebar::new(&cfg.id, below))))
        }
        "counter" => tree.mount(Box::new(ResizeAwareComponent::new(ResizeCounter::new(
            &cfg.id,
        )))),
        "status" => {
            let status = ReactiveBuilder::new("status", StatusLine::default())
                .on_resize(|s: &mut StatusLine, size| {
                    if let Some(prev) = s.last {
                        debug!(
                            target: "gallery",
                            "status {}x{} -> {}x{}",
                            prev.width,
                            prev.height,
                            size.width,
                            size.height
                        );
                    }
                    s.last = Some(size);
                })
                .build()?;
            tree.mount(Box::new(ResizeAwareComponent::new(status)))
        }
        other => {
            return Err(ViewError::Config(format!(
                "component '{}' has unknown kind '{}'",
                cfg.id, other
            )))
        }
    };
    Ok(id)
}
