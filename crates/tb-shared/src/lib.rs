//! Reference-counted, pool-recycled shared resources.
//!
//! `Shared<T>` is the handle application code posts through the pipeline;
//! `SharedPool<T>` / `KeyedSharedPool<K, T>` are the recycling allocators
//! behind it. Ref-counting is explicit (`add_ref`/`dispose`), not tied to
//! Rust's `Drop`, so that double-free and use-after-free are catchable
//! programmer errors rather than silent corruption or a compile error that
//! would make the pool's recycling discipline impossible to express.

mod clearable;
mod container;
mod error;
mod keyed;
mod pool;

pub use clearable::Clearable;
pub use container::Shared;
pub use error::{SharedError, SharedResult};
pub use keyed::KeyedSharedPool;
pub use pool::SharedPool;
