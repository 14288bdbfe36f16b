use crate::receiver::BoxFuture;
use crate::sync_context::SyncContext;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// The pipeline's worker pool. Every receiver is bound to a `SyncContext`;
/// this scheduler just spawns the drain future the receiver hands back
/// after each post onto the ambient tokio runtime, and keeps the join
/// handles so `Pipeline::stop` can wait for in-flight deliveries to finish
/// draining before returning.
#[derive(Default)]
pub struct Scheduler {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Scheduler::default())
    }

    #[must_use]
    pub fn new_context(&self, id: i32) -> Arc<SyncContext> {
        SyncContext::new(id)
    }

    pub(crate) fn spawn(&self, fut: BoxFuture) {
        let handle = tokio::spawn(fut);
        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Awaits every outstanding drain task. Called during `Pipeline::stop`
    /// so queued messages finish delivering before the pipeline reports
    /// itself stopped.
    pub async fn drain_all(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.handles.lock());
        debug!(count = handles.len(), "scheduler draining outstanding work");
        for handle in handles {
            let _ = handle.await;
        }
    }
}
