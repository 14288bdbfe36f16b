use std::sync::atomic::{AtomicI32, Ordering};

/// Dense, pipeline-unique id allocator for emitters, receivers, and
/// subpipelines. Ids are dense but not guaranteed contiguous, matching
/// `source_id` assignment in the data model.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator(AtomicI32);

impl IdAllocator {
    pub(crate) fn next(&self) -> i32 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}
