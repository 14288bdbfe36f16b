use crate::clearable::Clearable;
use crate::container::Shared;
use crate::pool::SharedPool;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

/// A concurrent map from key to `SharedPool<T>`, each populated by a
/// key-dependent allocator. Shares the unkeyed pool's get/recycle/reset
/// contract per key.
pub struct KeyedSharedPool<K, T: Clearable> {
    allocator: Arc<dyn Fn(&K) -> T + Send + Sync>,
    pools: RwLock<HashMap<K, Arc<SharedPool<T>>>>,
}

impl<K, T> KeyedSharedPool<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Clearable,
{
    #[must_use]
    pub fn new(allocator: impl Fn(&K) -> T + Send + Sync + 'static) -> Self {
        KeyedSharedPool {
            allocator: Arc::new(allocator),
            pools: RwLock::new(HashMap::new()),
        }
    }

    fn pool_for(&self, key: &K) -> Arc<SharedPool<T>> {
        if let Some(pool) = self.pools.read().unwrap().get(key) {
            return Arc::clone(pool);
        }
        let mut pools = self.pools.write().unwrap();
        if let Some(pool) = pools.get(key) {
            return Arc::clone(pool);
        }
        let key_owned = key.clone();
        let allocator = Arc::clone(&self.allocator);
        let pool = SharedPool::new(move || allocator(&key_owned));
        pools.insert(key.clone(), Arc::clone(&pool));
        pool
    }

    pub fn get_or_create(&self, key: &K) -> Shared<T> {
        self.pool_for(key).get_or_create()
    }

    pub fn try_get(&self, key: &K) -> Option<Shared<T>> {
        self.pools.read().unwrap().get(key).and_then(SharedPool::try_get)
    }

    /// Removes the pool for `key` entirely (e.g. once a parallel-sparse
    /// dispatch branch for that key has terminated).
    pub fn remove(&self, key: &K) {
        self.pools.write().unwrap().remove(key);
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.pools.read().unwrap().len()
    }
}
