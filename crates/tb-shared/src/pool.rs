use crate::clearable::Clearable;
use crate::container::Shared;
use crate::error::{SharedError, SharedResult};
use std::sync::{Arc, Mutex};
use tracing::{trace, warn};

struct PoolState<T> {
    available: Vec<T>,
    all_count: usize,
}

/// A recycling allocator for `Shared<T>` resources. `get_or_create` reuses
/// a cleared instance if one is available, else allocates a new one via
/// the configured factory. `recycle` is invoked only when a container's
/// ref-count reaches zero.
pub struct SharedPool<T: Clearable> {
    allocator: Box<dyn Fn() -> T + Send + Sync>,
    state: Mutex<PoolState<T>>,
}

impl<T: Clearable> SharedPool<T> {
    #[must_use]
    pub fn new(allocator: impl Fn() -> T + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(SharedPool {
            allocator: Box::new(allocator),
            state: Mutex::new(PoolState {
                available: Vec::new(),
                all_count: 0,
            }),
        })
    }

    /// Pops a cleared instance if one is available, else allocates via the
    /// factory and tracks it in `all`. Never fails.
    pub fn get_or_create(self: &Arc<Self>) -> Shared<T> {
        let mut state = self.state.lock().unwrap();
        let resource = match state.available.pop() {
            Some(r) => r,
            None => {
                state.all_count += 1;
                (self.allocator)()
            }
        };
        drop(state);
        Shared::from_pool(resource, Arc::clone(self))
    }

    /// Returns `None` if the pool has no available instance; never
    /// allocates.
    pub fn try_get(self: &Arc<Self>) -> Option<Shared<T>> {
        let resource = {
            let mut state = self.state.lock().unwrap();
            state.available.pop()
        }?;
        Some(Shared::from_pool(resource, Arc::clone(self)))
    }

    pub(crate) fn recycle(&self, resource: T) {
        let mut state = self.state.lock().unwrap();
        state.available.push(resource);
    }

    #[must_use]
    pub fn available_count(&self) -> usize {
        self.state.lock().unwrap().available.len()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.state.lock().unwrap().all_count
    }

    /// Disposes every currently available instance and forgets bookkeeping
    /// for any instances still outstanding. Unlike `reset`, never fails on
    /// live objects: it just drops them from the count instead of tracking
    /// them as leaked.
    pub fn dispose(&self) {
        let mut state = self.state.lock().unwrap();
        let dropped = state.available.len();
        let forgotten = state.all_count - dropped;
        state.available.clear();
        state.all_count = 0;
        trace!(dropped, forgotten, "pool disposed");
    }

    /// Empties the available free list. If `clear_live` is `false` and
    /// some instances are still outstanding (not all allocated instances
    /// are currently available), fails with `PoolHasLiveObjects` instead
    /// of emptying anything.
    pub fn reset(&self, clear_live: bool) -> SharedResult<()> {
        let mut state = self.state.lock().unwrap();
        if !clear_live && state.available.len() != state.all_count {
            let live = state.all_count - state.available.len();
            warn!(live, total = state.all_count, "pool reset rejected, live objects outstanding");
            return Err(SharedError::PoolHasLiveObjects {
                live,
                total: state.all_count,
            });
        }
        state.available.clear();
        Ok(())
    }
}
