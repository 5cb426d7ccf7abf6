use std::collections::HashSet;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

/// Tracks the threads currently inside one adapter.
///
/// A thread entering twice without leaving in between has come back to the
/// same adapter through its own dependencies.
#[derive(Debug, Default)]
pub(crate) struct CycleGuard {
    in_progress: Mutex<HashSet<ThreadId>>,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the current thread as in progress. Returns [`None`] if it
    /// already is.
    pub fn enter(&self) -> Option<GuardToken<'_>> {
        let thread = thread::current().id();
        if self.in_progress.lock().insert(thread) {
            Some(GuardToken {
                guard: self,
                thread,
            })
        } else {
            None
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress.lock().contains(&thread::current().id())
    }
}

/// Releases the current thread's slot when dropped, on every exit path.
#[derive(Debug)]
pub(crate) struct GuardToken<'a> {
    guard: &'a CycleGuard,
    thread: ThreadId,
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard.in_progress.lock().remove(&self.thread);
    }
}
