use crate::clearable::Clearable;
use crate::error::{caller_location, SharedError, SharedResult};
use crate::pool::SharedPool;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

struct SharedContainer<T: Clearable> {
    resource: Mutex<Option<T>>,
    ref_count: AtomicI32,
    disposed: AtomicBool,
    pool: Option<Arc<SharedPool<T>>>,
}

/// A reference-counted handle to a pooled resource.
///
/// Ref-counts are managed explicitly (`add_ref`/`dispose`), not by Rust's
/// ordinary `Drop`/`Clone` — matching the contract in spec §3: dropping a
/// `Shared<T>` handle without calling `dispose` does not recycle or free
/// the resource, and calling `dispose` more times than `add_ref`/`create`
/// is a programmer error (`DoubleFree`). Dereferencing a container whose
/// ref-count has reached zero is also fatal (`UseAfterFree`).
pub struct Shared<T: Clearable> {
    inner: Arc<SharedContainer<T>>,
}

impl<T: Clearable> Shared<T> {
    /// Creates a standalone shared resource, not backed by any pool, with
    /// `ref_count = 1`.
    #[must_use]
    pub fn new(resource: T) -> Self {
        Shared {
            inner: Arc::new(SharedContainer {
                resource: Mutex::new(Some(resource)),
                ref_count: AtomicI32::new(1),
                disposed: AtomicBool::new(false),
                pool: None,
            }),
        }
    }

    pub(crate) fn from_pool(resource: T, pool: Arc<SharedPool<T>>) -> Self {
        Shared {
            inner: Arc::new(SharedContainer {
                resource: Mutex::new(Some(resource)),
                ref_count: AtomicI32::new(1),
                disposed: AtomicBool::new(false),
                pool: Some(pool),
            }),
        }
    }

    /// Increments the ref-count and returns a new handle to the same
    /// underlying container.
    #[track_caller]
    pub fn add_ref(&self) -> SharedResult<Shared<T>> {
        if self.inner.disposed.load(Ordering::Acquire) {
            return Err(SharedError::UseAfterFree {
                location: caller_location(),
            });
        }
        self.inner.ref_count.fetch_add(1, Ordering::AcqRel);
        Ok(Shared {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Runs `f` against the resource, failing with `UseAfterFree` if the
    /// container has already been fully released.
    #[track_caller]
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> SharedResult<R> {
        if self.inner.disposed.load(Ordering::Acquire) {
            return Err(SharedError::UseAfterFree {
                location: caller_location(),
            });
        }
        let guard = self.inner.resource.lock().unwrap();
        match guard.as_ref() {
            Some(resource) => Ok(f(resource)),
            None => Err(SharedError::UseAfterFree {
                location: caller_location(),
            }),
        }
    }

    /// Decrements the ref-count. At zero, the resource is cleared and
    /// returned to the pool if one is set, else dropped.
    #[track_caller]
    pub fn dispose(&self) -> SharedResult<()> {
        let prev = self.inner.ref_count.fetch_sub(1, Ordering::AcqRel);
        if prev <= 0 {
            // Undo the decrement so a caller who ignores this error and
            // retries doesn't dig the counter further into the negatives.
            self.inner.ref_count.fetch_add(1, Ordering::AcqRel);
            return Err(SharedError::DoubleFree {
                location: caller_location(),
            });
        }
        if prev == 1 {
            self.inner.disposed.store(true, Ordering::Release);
            let resource = self.inner.resource.lock().unwrap().take();
            if let Some(mut resource) = resource {
                if T::IS_CLEAR_REQUIRED {
                    resource.clear();
                }
                if let Some(pool) = &self.inner.pool {
                    pool.recycle(resource);
                }
            }
        }
        Ok(())
    }

    /// Current ref-count; intended for diagnostics and tests, not for
    /// control flow (reading it is inherently racy under concurrent
    /// `add_ref`/`dispose`).
    #[must_use]
    pub fn ref_count(&self) -> i32 {
        self.inner.ref_count.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Buf(Vec<u8>);
    impl Clearable for Buf {
        fn clear(&mut self) {
            self.0.clear();
        }
    }

    #[test]
    fn add_ref_and_dispose_balance() {
        let s = Shared::new(Buf(vec![1, 2, 3]));
        let s2 = s.add_ref().unwrap();
        assert_eq!(s.ref_count(), 2);
        s.dispose().unwrap();
        assert!(s2.with(|b| b.0.clone()).unwrap() == vec![1, 2, 3]);
        s2.dispose().unwrap();
    }

    #[test]
    fn double_dispose_is_an_error() {
        let s = Shared::new(Buf(vec![]));
        s.dispose().unwrap();
        assert!(matches!(s.dispose(), Err(SharedError::DoubleFree { .. })));
    }

    #[test]
    fn use_after_free_is_an_error() {
        let s = Shared::new(Buf(vec![42]));
        s.dispose().unwrap();
        assert!(matches!(
            s.with(|_| ()),
            Err(SharedError::UseAfterFree { .. })
        ));
    }
}
