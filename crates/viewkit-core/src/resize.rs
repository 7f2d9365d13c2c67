use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};

use crate::component::Component;
use crate::ctx::{MountCtx, RenderCtx, ViewServices};
use crate::error::{ViewError, ViewResult};
use crate::events::{ListenerHandle, ResizeEvents, ResizeReaction, ViewportSize};

/// Reaction hook of a resize-aware component.
///
/// There is no default body: adopting the trait without the hook does not
/// compile.
pub trait ResizeAware: 'static {
    fn window_resize_handler(&mut self, size: ViewportSize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeState {
    Unmounted,
    /// Setup scheduled, waiting for the render-pass boundary.
    Mounting,
    Listening,
}

struct Registration {
    events: Rc<dyn ResizeEvents>,
    handle: ListenerHandle,
}

struct Slot {
    state: ResizeState,
    // Bumped by every mount and unmount; a pending setup task only acts if
    // the generation it was scheduled under is still current.
    generation: u64,
    listener: Option<Registration>,
}

/// Binds one host's resize reaction to the window resize event for exactly
/// as long as the host is mounted.
///
/// Mounting again while mounted replaces the previous setup, so a host never
/// owns more than one listener.
pub struct ResizeCapability {
    owner: &'static str,
    slot: Rc<RefCell<Slot>>,
}

impl ResizeCapability {
    pub fn new(owner: &'static str) -> Self {
        Self {
            owner,
            slot: Rc::new(RefCell::new(Slot {
                state: ResizeState::Unmounted,
                generation: 0,
                listener: None,
            })),
        }
    }

    #[inline]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    #[inline]
    pub fn state(&self) -> ResizeState {
        self.slot.borrow().state
    }

    #[inline]
    pub fn handle(&self) -> Option<ListenerHandle> {
        self.slot.borrow().listener.as_ref().map(|r| r.handle)
    }

    /// Schedule listener setup for after the current render pass.
    ///
    /// `bind` runs inside the deferred task and must produce the reaction
    /// already bound to the host. Nothing is registered synchronously.
    pub fn on_mount<F>(&self, services: &ViewServices, bind: F)
    where
        F: FnOnce() -> ResizeReaction + 'static,
    {
        let (generation, stale) = {
            let mut slot = self.slot.borrow_mut();
            if slot.state == ResizeState::Mounting {
                debug!(target: "viewkit::resize", "mount.supersede owner={}", self.owner);
            }
            slot.generation += 1;
            slot.state = ResizeState::Mounting;
            (slot.generation, slot.listener.take())
        };

        if let Some(stale) = stale {
            warn!(
                target: "viewkit::resize",
                "mount.reentrant owner={} replacing handle={:?}",
                self.owner,
                stale.handle
            );
            stale.events.remove_listener(stale.handle);
        }

        let slot = Rc::downgrade(&self.slot);
        let events = Rc::clone(services.events());
        let owner = self.owner;

        services.scheduler().schedule_after_render(Box::new(move || {
            let Some(slot) = slot.upgrade() else {
                trace!(target: "viewkit::resize", "setup.skip owner={} capability dropped", owner);
                return;
            };
            {
                let s = slot.borrow();
                if s.generation != generation || s.state != ResizeState::Mounting {
                    trace!(
                        target: "viewkit::resize",
                        "setup.skip owner={} generation={} current={}",
                        owner,
                        generation,
                        s.generation
                    );
                    return;
                }
            }

            let reaction = bind();
            let handle = events.add_listener(reaction);

            let mut s = slot.borrow_mut();
            s.listener = Some(Registration { events, handle });
            s.state = ResizeState::Listening;
            debug!(target: "viewkit::resize", "setup.done owner={} handle={:?}", owner, handle);
        }));
    }

    /// Stop listening. Total: without a listener this only resets state.
    pub fn on_unmount(&self) {
        let listener = {
            let mut slot = self.slot.borrow_mut();
            slot.generation += 1;
            slot.state = ResizeState::Unmounted;
            slot.listener.take()
        };

        match listener {
            Some(reg) => {
                reg.events.remove_listener(reg.handle);
                debug!(
                    target: "viewkit::resize",
                    "teardown owner={} handle={:?}",
                    self.owner,
                    reg.handle
                );
            }
            None => trace!(target: "viewkit::resize", "teardown.noop owner={}", self.owner),
        }
    }
}

impl Drop for ResizeCapability {
    fn drop(&mut self) {
        let listener = self.slot.borrow_mut().listener.take();
        if let Some(reg) = listener {
            reg.events.remove_listener(reg.handle);
        }
    }
}

/// Bind `C`'s reaction hook to a host instance.
///
/// The callback holds only a weak reference: once the host is gone it does
/// nothing.
pub fn bind_reaction<C: ResizeAware>(host: Weak<RefCell<C>>) -> ResizeReaction {
    Box::new(move |size: ViewportSize| {
        let Some(strong) = host.upgrade() else {
            return;
        };
        match strong.try_borrow_mut() {
            Ok(mut host) => host.window_resize_handler(size),
            Err(_) => warn!(
                target: "viewkit::resize",
                "dispatch.skip host busy {}x{}",
                size.width,
                size.height
            ),
        };
    })
}

/// Adds resize awareness to any component with a reaction hook.
pub struct ResizeAwareComponent<C: ResizeAware + Component> {
    host: Rc<RefCell<C>>,
    resize: ResizeCapability,
}

impl<C: ResizeAware + Component> ResizeAwareComponent<C> {
    pub fn new(host: C) -> Self {
        Self::from_shared(Rc::new(RefCell::new(host)))
    }

    pub fn from_shared(host: Rc<RefCell<C>>) -> Self {
        let owner = host.borrow().id();
        Self {
            host,
            resize: ResizeCapability::new(owner),
        }
    }

    /// Shared handle to the host state.
    #[inline]
    pub fn host(&self) -> Rc<RefCell<C>> {
        Rc::clone(&self.host)
    }

    #[inline]
    pub fn capability(&self) -> &ResizeCapability {
        &self.resize
    }
}

impl<C: ResizeAware + Component> Component for ResizeAwareComponent<C> {
    fn id(&self) -> &'static str {
        self.resize.owner()
    }

    fn on_mount(&mut self, ctx: &mut MountCtx<'_>) {
        self.host.borrow_mut().on_mount(ctx);
        let host = Rc::downgrade(&self.host);
        self.resize
            .on_mount(ctx.services(), move || bind_reaction(host));
    }

    fn render(&mut self, ctx: &RenderCtx) -> ViewResult<()> {
        self.host.borrow_mut().render(ctx)
    }

    fn on_unmount(&mut self) {
        self.resize.on_unmount();
        self.host.borrow_mut().on_unmount();
    }
}

type ReactionFn<S> = Box<dyn FnMut(&mut S, ViewportSize)>;

/// Component assembled at runtime from a state value and a closure.
pub struct Reactive<S> {
    id: &'static str,
    state: S,
    reaction: ReactionFn<S>,
}

impl<S> Reactive<S> {
    #[inline]
    pub fn state(&self) -> &S {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

impl<S: 'static> ResizeAware for Reactive<S> {
    fn window_resize_handler(&mut self, size: ViewportSize) {
        (self.reaction)(&mut self.state, size);
    }
}

impl<S: 'static> Component for Reactive<S> {
    fn id(&self) -> &'static str {
        self.id
    }
}

/// Builder for [`Reactive`].
///
/// Closures cannot be checked at compile time, so a missing reaction is
/// reported by `build` instead.
pub struct ReactiveBuilder<S> {
    id: &'static str,
    state: S,
    reaction: Option<ReactionFn<S>>,
}

impl<S: 'static> ReactiveBuilder<S> {
    pub fn new(id: &'static str, state: S) -> Self {
        Self {
            id,
            state,
            reaction: None,
        }
    }

    pub fn on_resize<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut S, ViewportSize) + 'static,
    {
        self.reaction = Some(Box::new(f));
        self
    }

    pub fn build(self) -> ViewResult<Reactive<S>> {
        let reaction = self.reaction.ok_or(ViewError::ContractViolation {
            component: self.id,
            hook: "window_resize_handler",
        })?;
        Ok(Reactive {
            id: self.id,
            state: self.state,
            reaction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::AfterRenderQueue;
    use std::cell::Cell;

    /// Resize event source that records every add/remove.
    #[derive(Default)]
    struct RecordingEvents {
        inner: RefCell<slotmap::SlotMap<ListenerHandle, ResizeReaction>>,
        added: RefCell<Vec<ListenerHandle>>,
        removed: RefCell<Vec<ListenerHandle>>,
    }

    impl RecordingEvents {
        fn fire(&self, size: ViewportSize) {
            for r in self.inner.borrow_mut().values_mut() {
                r(size);
            }
        }
    }

    impl ResizeEvents for RecordingEvents {
        fn add_listener(&self, reaction: ResizeReaction) -> ListenerHandle {
            let h = self.inner.borrow_mut().insert(reaction);
            self.added.borrow_mut().push(h);
            h
        }

        fn remove_listener(&self, handle: ListenerHandle) -> bool {
            self.removed.borrow_mut().push(handle);
            self.inner.borrow_mut().remove(handle).is_some()
        }
    }

    fn setup() -> (Rc<RecordingEvents>, AfterRenderQueue, ViewServices) {
        let events = Rc::new(RecordingEvents::default());
        let queue = AfterRenderQueue::new();
        let services = ViewServices::new(events.clone(), Rc::new(queue.clone()));
        (events, queue, services)
    }

    fn counter_reaction(hits: &Rc<Cell<u32>>) -> impl FnOnce() -> ResizeReaction + 'static {
        let hits = Rc::clone(hits);
        move || -> ResizeReaction { Box::new(move |_: ViewportSize| hits.set(hits.get() + 1)) }
    }

    #[test]
    fn registration_is_deferred_until_flush() {
        let (events, queue, services) = setup();
        let hits = Rc::new(Cell::new(0));
        let cap = ResizeCapability::new("probe");

        cap.on_mount(&services, counter_reaction(&hits));
        assert_eq!(cap.state(), ResizeState::Mounting);
        assert!(events.added.borrow().is_empty());
        assert_eq!(cap.handle(), None);

        queue.flush();
        assert_eq!(cap.state(), ResizeState::Listening);
        assert_eq!(events.added.borrow().len(), 1);
        assert_eq!(cap.handle(), events.added.borrow().first().copied());
    }

    #[test]
    fn unmount_removes_the_handle_that_was_registered() {
        let (events, queue, services) = setup();
        let hits = Rc::new(Cell::new(0));
        let cap = ResizeCapability::new("probe");

        cap.on_mount(&services, counter_reaction(&hits));
        queue.flush();
        events.fire(ViewportSize::new(1, 1));
        cap.on_unmount();
        events.fire(ViewportSize::new(2, 2));

        assert_eq!(hits.get(), 1);
        assert_eq!(*events.added.borrow(), *events.removed.borrow());
        assert_eq!(cap.state(), ResizeState::Unmounted);
        assert_eq!(cap.handle(), None);
    }

    #[test]
    fn unmount_without_setup_is_a_noop() {
        let (events, queue, services) = setup();
        let cap = ResizeCapability::new("probe");

        cap.on_unmount();
        assert!(events.removed.borrow().is_empty());

        // Unmount before the deferred task ran: the task must not register.
        let hits = Rc::new(Cell::new(0));
        cap.on_mount(&services, counter_reaction(&hits));
        cap.on_unmount();
        queue.flush();

        assert!(events.added.borrow().is_empty());
        assert!(events.removed.borrow().is_empty());
        assert_eq!(cap.state(), ResizeState::Unmounted);
    }

    #[test]
    fn remount_while_listening_replaces_listener() {
        let (events, queue, services) = setup();
        let hits = Rc::new(Cell::new(0));
        let cap = ResizeCapability::new("probe");

        cap.on_mount(&services, counter_reaction(&hits));
        queue.flush();
        let first = cap.handle();

        cap.on_mount(&services, counter_reaction(&hits));
        assert_eq!(events.removed.borrow().first().copied(), first);
        assert_eq!(cap.state(), ResizeState::Mounting);
        queue.flush();

        assert_eq!(events.inner.borrow().len(), 1);
        assert_ne!(cap.handle(), first);
        events.fire(ViewportSize::new(3, 3));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn remount_while_pending_runs_only_latest_setup() {
        let (events, queue, services) = setup();
        let hits = Rc::new(Cell::new(0));
        let cap = ResizeCapability::new("probe");

        cap.on_mount(&services, counter_reaction(&hits));
        cap.on_mount(&services, counter_reaction(&hits));
        assert_eq!(queue.flush(), 2);

        assert_eq!(events.added.borrow().len(), 1);
        assert_eq!(cap.state(), ResizeState::Listening);
    }

    #[test]
    fn dropping_capability_releases_listener_and_cancels_pending() {
        let (events, queue, services) = setup();
        let hits = Rc::new(Cell::new(0));

        let cap = ResizeCapability::new("probe");
        cap.on_mount(&services, counter_reaction(&hits));
        queue.flush();
        drop(cap);
        assert_eq!(events.removed.borrow().len(), 1);
        assert!(events.inner.borrow().is_empty());

        let pending = ResizeCapability::new("pending");
        pending.on_mount(&services, counter_reaction(&hits));
        drop(pending);
        queue.flush();
        assert_eq!(events.added.borrow().len(), 1);
    }

    struct Width(u32);

    impl ResizeAware for Width {
        fn window_resize_handler(&mut self, size: ViewportSize) {
            self.0 = size.width;
        }
    }

    #[test]
    fn bound_reaction_writes_host_state_and_survives_host_drop() {
        let host = Rc::new(RefCell::new(Width(0)));
        let mut reaction = bind_reaction(Rc::downgrade(&host));

        reaction(ViewportSize::new(320, 200));
        assert_eq!(host.borrow().0, 320);

        // Busy host: skipped, no panic.
        {
            let _guard = host.borrow_mut();
            reaction(ViewportSize::new(640, 200));
        }
        assert_eq!(host.borrow().0, 320);

        drop(host);
        reaction(ViewportSize::new(1, 1));
    }

    #[test]
    fn builder_without_reaction_is_a_contract_violation() {
        let err = ReactiveBuilder::new("bare", 0u32).build().err();
        match err {
            Some(ViewError::ContractViolation { component, hook }) => {
                assert_eq!(component, "bare");
                assert_eq!(hook, "window_resize_handler");
            }
            other => panic!("expected contract violation, got {other:?}"),
        }
    }

    #[test]
    fn built_reactive_dispatches_to_closure() {
        let mut r = ReactiveBuilder::new("tracker", Vec::new())
            .on_resize(|seen: &mut Vec<u32>, size| seen.push(size.height))
            .build()
            .expect("reaction supplied");

        r.window_resize_handler(ViewportSize::new(1, 7));
        r.window_resize_handler(ViewportSize::new(1, 9));
        assert_eq!(r.state(), &vec![7, 9]);
        assert_eq!(r.id(), "tracker");
    }
}
