use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

/// Viewport size in physical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

new_key_type! {
    /// Identifies exactly one registered resize callback.
    pub struct ListenerHandle;
}

/// Callback invoked on every resize event.
pub type ResizeReaction = Box<dyn FnMut(ViewportSize)>;

/// Source of "viewport size changed" notifications.
///
/// Add and remove take effect immediately.
pub trait ResizeEvents {
    fn add_listener(&self, reaction: ResizeReaction) -> ListenerHandle;

    /// Returns `false` if the handle was not registered here.
    fn remove_listener(&self, handle: ListenerHandle) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub registered: u64,
    pub removed: u64,
    pub dispatched: u64,
}

struct SourceState {
    // `None` while the listener is running.
    listeners: SlotMap<ListenerHandle, Option<ResizeReaction>>,
    size: ViewportSize,
    stats: ListenerStats,
}

/// The host window's resize event stream.
///
/// Cheap to clone; clones share listeners.
#[derive(Clone)]
pub struct WindowResizeSource {
    state: Rc<RefCell<SourceState>>,
}

impl WindowResizeSource {
    pub fn new(initial: ViewportSize) -> Self {
        Self {
            state: Rc::new(RefCell::new(SourceState {
                listeners: SlotMap::with_key(),
                size: initial,
                stats: ListenerStats::default(),
            })),
        }
    }

    /// Last size seen by `dispatch`, or the initial size.
    #[inline]
    pub fn size(&self) -> ViewportSize {
        self.state.borrow().size
    }

    #[inline]
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    #[inline]
    pub fn contains(&self, handle: ListenerHandle) -> bool {
        self.state.borrow().listeners.contains_key(handle)
    }

    #[inline]
    pub fn stats(&self) -> ListenerStats {
        self.state.borrow().stats
    }

    /// Deliver one resize event to every listener registered right now.
    ///
    /// Listeners may add or remove listeners (including themselves) while
    /// running. Newly added ones first fire on the next event. Returns the
    /// number of listeners invoked.
    pub fn dispatch(&self, size: ViewportSize) -> usize {
        let keys: Vec<ListenerHandle> = {
            let mut st = self.state.borrow_mut();
            st.size = size;
            st.stats.dispatched += 1;
            st.listeners.keys().collect()
        };

        let mut invoked = 0usize;
        for key in keys {
            let taken = self
                .state
                .borrow_mut()
                .listeners
                .get_mut(key)
                .and_then(Option::take);
            let Some(mut reaction) = taken else {
                continue;
            };

            reaction(size);
            invoked += 1;

            if let Some(slot) = self.state.borrow_mut().listeners.get_mut(key) {
                *slot = Some(reaction);
            }
        }

        trace!(
            target: "viewkit::events",
            "resize.dispatch {}x{} listeners={}",
            size.width,
            size.height,
            invoked
        );
        invoked
    }
}

impl ResizeEvents for WindowResizeSource {
    fn add_listener(&self, reaction: ResizeReaction) -> ListenerHandle {
        let mut st = self.state.borrow_mut();
        let handle = st.listeners.insert(Some(reaction));
        st.stats.registered += 1;
        debug!(
            target: "viewkit::events",
            "listener.add handle={:?} total={}",
            handle,
            st.listeners.len()
        );
        handle
    }

    fn remove_listener(&self, handle: ListenerHandle) -> bool {
        let mut st = self.state.borrow_mut();
        let removed = st.listeners.remove(handle).is_some();
        if removed {
            st.stats.removed += 1;
            debug!(
                target: "viewkit::events",
                "listener.remove handle={:?} total={}",
                handle,
                st.listeners.len()
            );
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting(hits: &Rc<Cell<u32>>) -> ResizeReaction {
        let hits = Rc::clone(hits);
        Box::new(move |_: ViewportSize| hits.set(hits.get() + 1))
    }

    #[test]
    fn dispatch_reaches_registered_listeners_only() {
        let src = WindowResizeSource::new(ViewportSize::new(800, 600));
        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));

        let ha = src.add_listener(counting(&a));
        let _hb = src.add_listener(counting(&b));
        assert_eq!(src.dispatch(ViewportSize::new(1024, 768)), 2);

        assert!(src.remove_listener(ha));
        assert!(!src.remove_listener(ha));
        assert_eq!(src.dispatch(ViewportSize::new(640, 480)), 1);

        assert_eq!((a.get(), b.get()), (1, 2));
        assert_eq!(src.size(), ViewportSize::new(640, 480));
        assert_eq!(
            src.stats(),
            ListenerStats {
                registered: 2,
                removed: 1,
                dispatched: 2
            }
        );
    }

    #[test]
    fn listener_can_remove_itself_while_running() {
        let src = WindowResizeSource::new(ViewportSize::default());
        let own: Rc<Cell<Option<ListenerHandle>>> = Rc::new(Cell::new(None));
        let hits = Rc::new(Cell::new(0));

        let src2 = src.clone();
        let own2 = Rc::clone(&own);
        let hits2 = Rc::clone(&hits);
        let h = src.add_listener(Box::new(move |_: ViewportSize| {
            hits2.set(hits2.get() + 1);
            if let Some(h) = own2.get() {
                assert!(src2.remove_listener(h));
            }
        }));
        own.set(Some(h));

        assert_eq!(src.dispatch(ViewportSize::new(10, 10)), 1);
        assert!(!src.contains(h));
        assert_eq!(src.listener_count(), 0);
        assert_eq!(src.dispatch(ViewportSize::new(20, 20)), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_added_during_dispatch_fires_next_time() {
        let src = WindowResizeSource::new(ViewportSize::default());
        let late = Rc::new(Cell::new(0));

        let src2 = src.clone();
        let late2 = Rc::clone(&late);
        let added = Rc::new(Cell::new(false));
        src.add_listener(Box::new(move |_: ViewportSize| {
            if !added.replace(true) {
                src2.add_listener(counting(&late2));
            }
        }));

        assert_eq!(src.dispatch(ViewportSize::new(1, 1)), 1);
        assert_eq!(late.get(), 0);
        assert_eq!(src.dispatch(ViewportSize::new(2, 2)), 2);
        assert_eq!(late.get(), 1);
    }
}
