use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Condvar, MutexGuard};

/// Condition variable that remembers how it has been used.
///
/// The harness relies on these counters to check that the dispatcher really
/// blocks on its conditions instead of spinning.
#[derive(Debug)]
pub struct ObservedCondition {
    name: &'static str,
    condvar: Condvar,
    awaited: AtomicBool,
    signalled: AtomicBool,
    waiters: AtomicUsize,
}

impl ObservedCondition {
    pub fn new(name: &'static str) -> Self {
        ObservedCondition {
            name,
            condvar: Condvar::new(),
            awaited: AtomicBool::new(false),
            signalled: AtomicBool::new(false),
            waiters: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Releases the lock behind `guard` while blocked. Wakeups may be spurious,
    /// callers re-check their predicate.
    pub fn wait<T>(&self, guard: &mut MutexGuard<'_, T>) {
        self.awaited.store(true, Ordering::SeqCst);
        self.waiters.fetch_add(1, Ordering::SeqCst);
        self.condvar.wait(guard);
        self.waiters.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn notify_all(&self) {
        self.signalled.store(true, Ordering::SeqCst);
        self.condvar.notify_all();
    }

    /// Wakes every waiter without recording a signal. Used on shutdown.
    pub fn wake_all(&self) {
        self.condvar.notify_all();
    }

    pub fn was_awaited(&self) -> bool {
        self.awaited.load(Ordering::SeqCst)
    }

    pub fn was_signalled(&self) -> bool {
        self.signalled.load(Ordering::SeqCst)
    }

    pub fn waiters(&self) -> usize {
        self.waiters.load(Ordering::SeqCst)
    }
}
