//! Exit signalling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Wakes a backend blocked inside a loop iteration.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    requested: AtomicBool,
    waker: Mutex<Option<Waker>>,
}

/// Cloneable request-exit handle.
///
/// Requesting exit is sticky: once set, every later `run_once` returns the
/// exit sentinel without blocking. Clones may be moved into menu callbacks or
/// other threads.
#[derive(Clone)]
pub struct ExitSignal {
    inner: Arc<Inner>,
}

impl ExitSignal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                requested: AtomicBool::new(false),
                waker: Mutex::new(None),
            }),
        }
    }

    pub fn request(&self) {
        if self.inner.requested.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!("tray exit requested");
        let waker = match self.inner.waker.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(wake) = waker {
            wake();
        }
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    pub(crate) fn set_waker(&self, waker: Option<Waker>) {
        match self.inner.waker.lock() {
            Ok(mut guard) => *guard = waker,
            Err(poisoned) => *poisoned.into_inner() = waker,
        }
    }
}

impl Default for ExitSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExitSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExitSignal")
            .field("requested", &self.is_requested())
            .finish()
    }
}
