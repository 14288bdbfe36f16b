use std::sync::Arc;
use tokio::sync::Mutex;

/// The serialization domain a receiver's owning component runs on. Every
/// receiver bound to the same `SyncContext` executes its handlers one at a
/// time, in post order; receivers on distinct contexts may run
/// concurrently.
///
/// Queue push/pop (the hot path, `crate::queue::ReceiverQueue`) is guarded
/// by `parking_lot::Mutex`, the spin-lock-style primitive this design
/// favors for short, uncontended critical sections. Handler *execution*
/// needs to be held across `.await` for the async handler variant, which
/// a `parking_lot::MutexGuard` cannot be (it isn't `Send`), so this
/// context itself serializes on a `tokio::sync::Mutex` instead.
pub struct SyncContext {
    id: i32,
    lock: Mutex<()>,
}

impl SyncContext {
    pub(crate) fn new(id: i32) -> Arc<Self> {
        Arc::new(SyncContext {
            id,
            lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Runs `f` (a future) with this context's lock held, blocking other
    /// deliveries on the same context until it completes.
    pub(crate) async fn run<Fut>(&self, f: Fut)
    where
        Fut: std::future::Future<Output = ()>,
    {
        let _guard = self.lock.lock().await;
        f.await;
    }

    /// Attempts to acquire this context's lock without waiting. Used for
    /// the `SynchronousOrThrottle` same-thread delivery fast path: if
    /// another delivery already holds the context, the caller falls back
    /// to scheduling instead of blocking the posting thread.
    pub(crate) fn try_lock_sync(&self) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        self.lock.try_lock().ok()
    }
}
