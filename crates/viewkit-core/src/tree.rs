use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::component::Component;
use crate::ctx::{MountCtx, RenderCtx, ViewServices};
use crate::error::ViewResult;
use crate::events::{ViewportSize, WindowResizeSource};
use crate::resize::{ResizeAware, ResizeAwareComponent};
use crate::schedule::AfterRenderQueue;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Node {
    id: NodeId,
    component: Box<dyn Component>,
}

/// The active display tree.
///
/// Single point of truth for who is mounted and when lifecycle hooks run.
/// Components render in insertion order; each render pass ends at the
/// after-render boundary.
pub struct DisplayTree {
    services: ViewServices,
    source: WindowResizeSource,
    after_render: AfterRenderQueue,

    nodes: Vec<Node>,
    next_id: u64,
    pass: u64,
}

impl DisplayTree {
    pub fn new(source: WindowResizeSource, after_render: AfterRenderQueue) -> Self {
        let services = ViewServices::new(
            Rc::new(source.clone()),
            Rc::new(after_render.clone()),
        );
        Self {
            services,
            source,
            after_render,
            nodes: Vec::new(),
            next_id: 1,
            pass: 0,
        }
    }

    pub fn with_viewport(viewport: ViewportSize) -> Self {
        Self::new(WindowResizeSource::new(viewport), AfterRenderQueue::new())
    }

    #[inline]
    pub fn services(&self) -> &ViewServices {
        &self.services
    }

    #[inline]
    pub fn source(&self) -> &WindowResizeSource {
        &self.source
    }

    #[inline]
    pub fn viewport(&self) -> ViewportSize {
        self.source.size()
    }

    #[inline]
    pub fn pass_index(&self) -> u64 {
        self.pass
    }

    /// Deferred tasks waiting for the next render-pass boundary.
    #[inline]
    pub fn pending_after_render(&self) -> usize {
        self.after_render.pending()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Insert and fire `on_mount`.
    pub fn mount(&mut self, mut component: Box<dyn Component>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let mut ctx = MountCtx::new(&self.services, self.source.size());
        component.on_mount(&mut ctx);

        info!(target: "viewkit::tree", "mount id={} component={}", id, component.id());
        self.nodes.push(Node { id, component });
        id
    }

    /// Mount a resize-aware host, returning a shared handle to its state.
    pub fn mount_resize_aware<C>(&mut self, host: C) -> (NodeId, Rc<RefCell<C>>)
    where
        C: ResizeAware + Component,
    {
        let wrapped = ResizeAwareComponent::new(host);
        let handle = wrapped.host();
        (self.mount(Box::new(wrapped)), handle)
    }

    /// Fire `on_unmount` and drop the component. Unknown ids return `false`.
    pub fn unmount(&mut self, id: NodeId) -> bool {
        let Some(pos) = self.nodes.iter().position(|n| n.id == id) else {
            debug!(target: "viewkit::tree", "unmount.unknown id={}", id);
            return false;
        };

        let mut node = self.nodes.remove(pos);
        node.component.on_unmount();
        info!(target: "viewkit::tree", "unmount id={} component={}", id, node.component.id());
        true
    }

    /// Unmount everything, newest first.
    pub fn unmount_all(&mut self) -> usize {
        let n = self.nodes.len();
        while let Some(mut node) = self.nodes.pop() {
            node.component.on_unmount();
            debug!(target: "viewkit::tree", "unmount id={} component={}", node.id, node.component.id());
        }
        if n > 0 {
            info!(target: "viewkit::tree", "unmount_all count={}", n);
        }
        n
    }

    /// Render every node, then cross the after-render boundary.
    ///
    /// The boundary is crossed even when a render fails. Returns the number
    /// of deferred tasks run, or the first render error.
    pub fn render_pass(&mut self) -> ViewResult<usize> {
        self.pass += 1;
        let ctx = RenderCtx {
            pass: self.pass,
            viewport: self.source.size(),
        };

        let mut first_err = None;
        for node in self.nodes.iter_mut() {
            if let Err(e) = node.component.render(&ctx) {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }

        let flushed = self.after_render.flush();
        match first_err {
            Some(e) => Err(e),
            None => Ok(flushed),
        }
    }

    /// Deliver one resize event. Returns the number of reactions invoked.
    #[inline]
    pub fn dispatch_resize(&self, size: ViewportSize) -> usize {
        self.source.dispatch(size)
    }
}

impl Drop for DisplayTree {
    fn drop(&mut self) {
        self.unmount_all();
    }
}
