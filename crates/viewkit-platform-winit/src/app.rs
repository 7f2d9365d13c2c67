use std::time::Duration;

use log::{debug, error, info, trace, warn};
use viewkit_core::{DisplayTree, ViewConfig, ViewError, ViewResult};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::events::viewport_from_physical;
use crate::signals::ShutdownFlag;

struct App {
    tree: DisplayTree,

    title: String,
    size: LogicalSize<u32>,
    poll: Duration,

    window: Option<Window>,
    shutdown: ShutdownFlag,
    shutdown_done: bool,

    // First fatal error; returned from `run_winit_app`.
    failure: Option<ViewError>,
}

impl App {
    fn new(tree: DisplayTree, cfg: &ViewConfig, shutdown: ShutdownFlag) -> Self {
        Self {
            tree,
            title: cfg.title.clone(),
            size: LogicalSize::new(cfg.width, cfg.height),
            poll: Duration::from_millis(cfg.poll_interval_ms.max(1)),
            window: None,
            shutdown,
            shutdown_done: false,
            failure: None,
        }
    }

    #[inline]
    fn request_redraw(&self) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn shutdown_once(&mut self, el: &ActiveEventLoop) {
        if self.shutdown_done {
            return;
        }
        self.shutdown_done = true;

        let n = self.tree.unmount_all();
        info!(target: "viewkit::winit", "shutdown unmounted={}", n);
        el.exit();
    }

    fn render(&mut self, el: &ActiveEventLoop) {
        match self.tree.render_pass() {
            Ok(flushed) => {
                if flushed > 0 {
                    debug!(
                        target: "viewkit::winit",
                        "pass={} after_render tasks={}",
                        self.tree.pass_index(),
                        flushed
                    );
                }
            }
            Err(e) => {
                error!(target: "viewkit::winit", "render failed: {e}");
                self.failure.get_or_insert(e);
                self.shutdown_once(el);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, el: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(self.size);

        let window = match el.create_window(attrs) {
            Ok(w) => w,
            Err(e) => {
                error!(target: "viewkit::winit", "failed to create window: {e}");
                self.failure
                    .get_or_insert(ViewError::Platform(e.to_string()));
                self.shutdown_once(el);
                return;
            }
        };

        // Bring the source in line with the real surface before anyone listens.
        let initial = viewport_from_physical(window.inner_size());
        self.tree.dispatch_resize(initial);
        info!(
            target: "viewkit::winit",
            "window ready {}x{} components={}",
            initial.width,
            initial.height,
            self.tree.len()
        );

        self.window = Some(window);

        // Kick the first pass so deferred setup runs.
        self.request_redraw();
    }

    fn window_event(&mut self, el: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(Window::id) != Some(id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown_once(el),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown_once(el),
            WindowEvent::Resized(size) => {
                let viewport = viewport_from_physical(size);
                let invoked = self.tree.dispatch_resize(viewport);
                trace!(
                    target: "viewkit::winit",
                    "resized {}x{} reactions={}",
                    viewport.width,
                    viewport.height,
                    invoked
                );
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if !self.shutdown_done {
                    self.render(el);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, el: &ActiveEventLoop) {
        if self.shutdown.is_set() {
            self.shutdown_once(el);
            return;
        }

        // Mounts made outside a pass still need a boundary.
        if self.tree.pending_after_render() > 0 {
            self.request_redraw();
        }

        el.set_control_flow(ControlFlow::wait_duration(self.poll));
    }
}

/// Run the display tree inside a winit event loop until the window closes.
///
/// The platform crate owns the loop and feeds resize events into the tree.
pub fn run_winit_app(tree: DisplayTree, cfg: &ViewConfig) -> ViewResult<()> {
    let event_loop = EventLoop::new().map_err(|e| ViewError::Platform(e.to_string()))?;

    let shutdown = ShutdownFlag::new();
    if let Err(e) = shutdown.install_ctrlc() {
        warn!(target: "viewkit::winit", "Ctrl+C handler not installed: {e}");
    }

    let mut app = App::new(tree, cfg, shutdown);
    event_loop
        .run_app(&mut app)
        .map_err(|e| ViewError::Platform(e.to_string()))?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
