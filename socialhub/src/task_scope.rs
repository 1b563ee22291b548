//! Scope-bound background tasks.
//!
//! A view-model owns a [`TaskScope`]; dropping the view-model drops the scope,
//! which aborts everything spawned through it.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct TaskScope {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task tied to this scope. Must be called inside a tokio runtime.
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(fut);
        let mut handles = self.handles();
        handles.retain(|handle| !handle.is_finished());
        handles.push(handle);
    }

    /// Number of tasks still running
    pub fn active(&self) -> usize {
        self.handles()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    pub fn cancel_all(&self) {
        for handle in self.handles().drain(..) {
            handle.abort();
        }
    }

    fn handles(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// A single task that is aborted when the guard is dropped or replaced.
#[derive(Debug)]
pub struct AbortOnDrop(JoinHandle<()>);

impl AbortOnDrop {
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self(tokio::spawn(fut))
    }

    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}
