//! Deferred scroll-info notifications.
//!
//! Laying out a run of sibling scroll containers would otherwise notify the
//! scrolling machinery once per container and once more for every ancestor
//! whose overflow changed. A [`ScrollInfoBatch`] queues those notifications
//! while any [`ScrollInfoGuard`] is alive and delivers each box once when
//! the outermost guard drops, on every exit path.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::FxIndexSet;
use crate::tree::BoxId;

/// Receives "the scrollable area of this box changed" notifications.
pub trait ScrollInfoSink {
    /// The scroll extent or clip of `id` may have changed.
    fn update_scroll_info(&mut self, id: BoxId);
}

impl<F: FnMut(BoxId)> ScrollInfoSink for F {
    fn update_scroll_info(&mut self, id: BoxId) {
        self(id);
    }
}

struct BatchState {
    depth: usize,
    pending: FxIndexSet<BoxId>,
    /// Taken out while a delivery is running.
    sink: Option<Box<dyn ScrollInfoSink>>,
}

/// Deliver everything queued, with no borrow of the state held while the
/// sink runs. Requests the sink itself makes are delivered by the same
/// loop.
fn flush(state: &RefCell<BatchState>) {
    let Some(mut sink) = state.borrow_mut().sink.take() else {
        // A delivery further up the stack picks the queue up.
        return;
    };
    loop {
        let pending = {
            let mut state = state.borrow_mut();
            if state.depth > 0 {
                break;
            }
            std::mem::take(&mut state.pending)
        };
        if pending.is_empty() {
            break;
        }
        for id in pending {
            sink.update_scroll_info(id);
        }
    }
    state.borrow_mut().sink = Some(sink);
}

/// A shared handle to one document's scroll-info queue.
///
/// Cloning the handle shares the queue.
#[derive(Clone)]
pub struct ScrollInfoBatch {
    state: Rc<RefCell<BatchState>>,
}

impl fmt::Debug for ScrollInfoBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ScrollInfoBatch")
            .field("depth", &state.depth)
            .field("pending", &state.pending)
            .finish_non_exhaustive()
    }
}

impl Default for ScrollInfoBatch {
    fn default() -> Self {
        Self::new(|_: BoxId| {})
    }
}

impl ScrollInfoBatch {
    /// A batch delivering to `sink`.
    #[must_use]
    pub fn new(sink: impl ScrollInfoSink + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(BatchState {
                depth: 0,
                pending: FxIndexSet::default(),
                sink: Some(Box::new(sink)),
            })),
        }
    }

    /// Start deferring notifications until the returned guard (and every
    /// guard entered before it) is dropped. Guards nest.
    #[must_use = "notifications are only deferred while the guard is alive"]
    pub fn delay(&self) -> ScrollInfoGuard {
        self.state.borrow_mut().depth += 1;
        ScrollInfoGuard {
            state: Rc::clone(&self.state),
        }
    }

    /// Notify the sink about `id`, or queue the notification while delayed.
    /// Queued notifications are deduplicated and keep their first-request
    /// order.
    pub fn update_scroll_info(&self, id: BoxId) {
        let delayed = {
            let mut state = self.state.borrow_mut();
            let _ = state.pending.insert(id);
            state.depth > 0
        };
        if !delayed {
            flush(&self.state);
        }
    }

    /// Whether a guard is currently alive.
    #[must_use]
    pub fn is_delaying(&self) -> bool {
        self.state.borrow().depth > 0
    }

    /// Number of queued notifications.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.state.borrow().pending.len()
    }
}

/// Scope of a deferral started by [`ScrollInfoBatch::delay`].
///
/// Dropping the outermost guard flushes the queue.
pub struct ScrollInfoGuard {
    state: Rc<RefCell<BatchState>>,
}

impl fmt::Debug for ScrollInfoGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollInfoGuard").finish_non_exhaustive()
    }
}

impl Drop for ScrollInfoGuard {
    fn drop(&mut self) {
        {
            let mut state = self.state.borrow_mut();
            state.depth = state.depth.saturating_sub(1);
            if state.depth > 0 {
                return;
            }
            if !state.pending.is_empty() {
                log::trace!(
                    target: "boxwood::scroll",
                    "flushing {} scroll-info updates",
                    state.pending.len()
                );
            }
        }
        flush(&self.state);
    }
}
