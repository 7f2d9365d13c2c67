use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

use crate::commands::CommandQueue;

/// Work deferred until the current render pass has finished.
pub type DeferredTask = Box<dyn FnOnce()>;

/// "Run this once, after the current render pass."
///
/// Contract: every task runs exactly once, in scheduling order, no earlier
/// than the next render-pass boundary.
pub trait DeferredScheduler {
    fn schedule_after_render(&self, task: DeferredTask);
}

/// Queue flushed by the display tree at the end of each render pass.
#[derive(Clone, Default)]
pub struct AfterRenderQueue {
    queue: Rc<RefCell<CommandQueue<DeferredTask>>>,
}

impl AfterRenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            queue: Rc::new(RefCell::new(CommandQueue::with_capacity(cap))),
        }
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Render-pass boundary.
    ///
    /// Runs the tasks queued before this call. Tasks scheduled by those tasks
    /// wait for the next boundary.
    pub fn flush(&self) -> usize {
        let batch = self.queue.borrow_mut().take_all();
        let n = batch.len();
        for task in batch {
            task();
        }
        if n > 0 {
            trace!(target: "viewkit::schedule", "after_render.flush tasks={}", n);
        }
        n
    }
}

impl DeferredScheduler for AfterRenderQueue {
    fn schedule_after_render(&self, task: DeferredTask) {
        self.queue.borrow_mut().push(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn tasks_wait_for_flush_and_run_in_order() {
        let q = AfterRenderQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for i in 0..3 {
            let log = Rc::clone(&log);
            q.schedule_after_render(Box::new(move || log.borrow_mut().push(i)));
        }
        assert!(log.borrow().is_empty());
        assert_eq!(q.pending(), 3);

        assert_eq!(q.flush(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);

        // Exactly once.
        assert_eq!(q.flush(), 0);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn task_scheduled_during_flush_runs_at_next_boundary() {
        let q = AfterRenderQueue::new();
        let hits = Rc::new(Cell::new(0u32));

        let inner_q = q.clone();
        let inner_hits = Rc::clone(&hits);
        q.schedule_after_render(Box::new(move || {
            let h = Rc::clone(&inner_hits);
            inner_q.schedule_after_render(Box::new(move || h.set(h.get() + 1)));
        }));

        assert_eq!(q.flush(), 1);
        assert_eq!(hits.get(), 0);
        assert_eq!(q.pending(), 1);

        assert_eq!(q.flush(), 1);
        assert_eq!(hits.get(), 1);
    }
}
