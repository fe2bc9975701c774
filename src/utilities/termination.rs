use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info};
use parking_lot::Mutex;

use super::error::Violation;

type WakeHook = Box<dyn Fn() + Send + Sync>;

struct Inner {
    terminated: AtomicBool,
    failure: Mutex<Option<Violation>>,
    // Never sends. Dropping it disconnects `closed`, which wakes every `select!`.
    closer: Mutex<Option<Sender<()>>>,
    closed: Receiver<()>,
    hooks: Mutex<Vec<WakeHook>>,
}

/// Shared shutdown flag for every thread in the simulation.
///
/// Must not be terminated while holding the dispatch lock or an elevator lock:
/// wake hooks take the dispatch lock themselves.
#[derive(Clone)]
pub struct Termination {
    inner: Arc<Inner>,
}

impl Termination {
    pub fn new() -> Self {
        let (closer, closed) = bounded(0);
        Termination {
            inner: Arc::new(Inner {
                terminated: AtomicBool::new(false),
                failure: Mutex::new(None),
                closer: Mutex::new(Some(closer)),
                closed,
                hooks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.terminated.load(Ordering::SeqCst)
    }

    pub fn terminate(&self) {
        if self.inner.terminated.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("terminating simulation");
        self.inner.closer.lock().take();
        let hooks = std::mem::take(&mut *self.inner.hooks.lock());
        for hook in hooks {
            hook();
        }
    }

    /// Records the violation (only the first one is kept) and terminates.
    pub fn fail(&self, violation: Violation) {
        error!("simulation failed: {}", violation);
        {
            let mut failure = self.inner.failure.lock();
            if failure.is_none() {
                *failure = Some(violation);
            }
        }
        self.terminate();
    }

    pub fn failure(&self) -> Option<Violation> {
        self.inner.failure.lock().clone()
    }

    pub fn passed(&self) -> bool {
        self.inner.failure.lock().is_none()
    }

    /// Receiver that never yields a value and disconnects on termination.
    pub fn receiver(&self) -> Receiver<()> {
        self.inner.closed.clone()
    }

    /// Runs `hook` once on termination, or right away if already terminated.
    pub fn on_terminate<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        {
            let mut hooks = self.inner.hooks.lock();
            if !self.is_terminated() {
                hooks.push(Box::new(hook));
                return;
            }
        }
        hook();
    }
}

impl Default for Termination {
    fn default() -> Self {
        Termination::new()
    }
}
