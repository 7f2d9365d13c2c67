use std::rc::Rc;

use crate::events::{ResizeEvents, ViewportSize};
use crate::schedule::DeferredScheduler;

/// Host infrastructure shared by every mounted component.
#[derive(Clone)]
pub struct ViewServices {
    events: Rc<dyn ResizeEvents>,
    scheduler: Rc<dyn DeferredScheduler>,
}

impl ViewServices {
    #[inline]
    pub fn new(events: Rc<dyn ResizeEvents>, scheduler: Rc<dyn DeferredScheduler>) -> Self {
        Self { events, scheduler }
    }

    #[inline]
    pub fn events(&self) -> &Rc<dyn ResizeEvents> {
        &self.events
    }

    #[inline]
    pub fn scheduler(&self) -> &Rc<dyn DeferredScheduler> {
        &self.scheduler
    }
}

/// Context passed to `Component::on_mount`.
///
/// Components never see the tree itself.
pub struct MountCtx<'a> {
    services: &'a ViewServices,
    viewport: ViewportSize,
}

impl<'a> MountCtx<'a> {
    #[inline]
    pub(crate) fn new(services: &'a ViewServices, viewport: ViewportSize) -> Self {
        Self { services, viewport }
    }

    #[inline]
    pub fn services(&self) -> &ViewServices {
        self.services
    }

    #[inline]
    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }
}

/// Snapshot handed to `Component::render`.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub pass: u64,
    pub viewport: ViewportSize,
}
