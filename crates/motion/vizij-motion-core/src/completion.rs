//! Completion notification.
//!
//! [`CompletionSignal`] is owned by the controller. Each arm hands out
//! [`Finished`] futures that resolve once the signal is resolved. Re-arming
//! swaps in a fresh, unresolved slot; futures from earlier arms keep
//! observing the slot they were created from.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

#[derive(Default)]
struct Slot {
    resolved: bool,
    wakers: Vec<Waker>,
}

#[derive(Default)]
pub struct CompletionSignal {
    slot: Rc<RefCell<Slot>>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the current arm, waking every listener. Idempotent.
    pub fn resolve(&self) {
        let wakers = {
            let mut slot = self.slot.borrow_mut();
            if slot.resolved {
                return;
            }
            slot.resolved = true;
            std::mem::take(&mut slot.wakers)
        };
        for waker in wakers {
            waker.wake();
        }
    }

    /// Replace the current arm with a fresh unresolved one.
    pub fn rearm(&mut self) {
        self.slot = Rc::default();
    }

    pub fn listen(&self) -> Finished {
        Finished {
            slot: Rc::clone(&self.slot),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.borrow().resolved
    }
}

impl fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSignal")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Future resolving when the animation it was taken from finishes (or is
/// cancelled).
#[derive(Clone)]
pub struct Finished {
    slot: Rc<RefCell<Slot>>,
}

impl Finished {
    pub fn is_resolved(&self) -> bool {
        self.slot.borrow().resolved
    }
}

impl Future for Finished {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut slot = self.slot.borrow_mut();
        if slot.resolved {
            return Poll::Ready(());
        }
        if !slot.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            slot.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

impl fmt::Debug for Finished {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finished")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::task::Wake;

    #[derive(Default)]
    struct CountingWaker(AtomicUsize);

    impl Wake for CountingWaker {
        fn wake(self: Arc<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn pending_until_resolved_then_wakes() {
        let signal = CompletionSignal::new();
        let mut fut = signal.listen();
        let counter = Arc::new(CountingWaker::default());
        let waker = Waker::from(Arc::clone(&counter));
        let mut cx = Context::from_waker(&waker);

        assert_eq!(Pin::new(&mut fut).poll(&mut cx), Poll::Pending);
        assert_eq!(Pin::new(&mut fut).poll(&mut cx), Poll::Pending);
        signal.resolve();
        signal.resolve();
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(Pin::new(&mut fut).poll(&mut cx), Poll::Ready(()));
    }

    #[test]
    fn rearm_leaves_old_listeners_alone() {
        let mut signal = CompletionSignal::new();
        let first = signal.listen();
        signal.resolve();
        signal.rearm();
        let second = signal.listen();
        assert!(first.is_resolved());
        assert!(!second.is_resolved());
        assert!(!signal.is_resolved());
        pollster::block_on(first);
    }
}
