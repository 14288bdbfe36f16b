use crate::context::{DeserializationContext, SerializationContext};
use crate::error::SerializeResult;
use crate::schema::TypeSchema;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tb_buffer::{BufferReader, BufferWriter};

/// Per-type serialization operations: the Rust-idiomatic stand-in for the
/// source's IL-emitted generic serializer (see spec §9). Hand-written
/// serializers implement this trait directly; reflection-derived ones are
/// generated by a derive macro in a full build (not included here — see
/// DESIGN.md) but follow the identical trait surface, so either kind
/// registers into the same `HandlerRegistry`.
pub trait Serializer<T>: Send + Sync {
    fn initialize(&mut self, target_schema: &TypeSchema);
    fn serialize(&self, value: &T, writer: &mut BufferWriter, ctx: &mut SerializationContext);
    fn deserialize(
        &self,
        reader: &mut BufferReader,
        ctx: &mut DeserializationContext<T>,
    ) -> SerializeResult<T>;
    fn clone_value(&self, source: &T) -> T;
    fn clear(&self, value: &mut T);

    /// Readies `target` to receive a deserialized value in place. Given a
    /// recycled instance (typically from a `SharedPool`), a handler that
    /// supports in-place reuse clears and returns it instead of letting
    /// `deserialize` allocate fresh; the default just passes the instance
    /// through unchanged.
    fn prepare_deserialize_target(&self, target: Option<T>) -> Option<T> {
        target
    }

    /// Readies `target` to receive a cloned value in place, mirroring
    /// `prepare_deserialize_target` for the clone path.
    fn prepare_clone_target(&self, target: Option<T>) -> Option<T> {
        target
    }

    /// Immutable types report `false` so pools can skip the call entirely.
    fn is_clear_required(&self) -> bool {
        true
    }
}

/// Lazily-instantiated, per-type handler cache.
///
/// A hand-rolled `TypeId`-keyed map rather than a generic "any map" crate:
/// the registry is read from the scheduler's worker threads and written
/// at most once per type (the "single-writer lock around the whole
/// AddHandler path" in spec §4.D/§5), so it needs a `Send + Sync` map of
/// trait objects; a plain `anymap`-style map (as the dynamic-typing
/// pattern used for ECS component stores in other parts of this crate's
/// lineage) stores bare `Box<dyn Any>`, which is not itself `Send`/`Sync`,
/// so a small dedicated map is used here instead.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

struct Slot<T>(Arc<dyn Serializer<T>>);

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        HandlerRegistry::default()
    }

    /// Registers `handler` for `T`, replacing any previously registered
    /// handler. Call sites typically guard this with `get_or_init` below
    /// rather than calling it directly on every lookup.
    pub fn register<T: 'static>(&self, handler: Arc<dyn Serializer<T>>) {
        let mut handlers = self.handlers.write().unwrap();
        handlers.insert(TypeId::of::<T>(), Arc::new(Slot(handler)) as Arc<dyn Any + Send + Sync>);
    }

    #[must_use]
    pub fn get<T: 'static>(&self) -> Option<Arc<dyn Serializer<T>>> {
        let handlers = self.handlers.read().unwrap();
        handlers
            .get(&TypeId::of::<T>())
            .and_then(|erased| erased.downcast_ref::<Slot<T>>())
            .map(|slot| Arc::clone(&slot.0))
    }

    /// Returns the cached handler for `T`, or builds one via `init`,
    /// caches it, and returns it. `init` runs at most once per type even
    /// under concurrent callers: the whole check-then-insert path holds
    /// the write lock.
    pub fn get_or_init<T: 'static>(
        &self,
        init: impl FnOnce() -> Arc<dyn Serializer<T>>,
    ) -> Arc<dyn Serializer<T>> {
        if let Some(existing) = self.get::<T>() {
            return existing;
        }
        let mut handlers = self.handlers.write().unwrap();
        if let Some(existing) = handlers
            .get(&TypeId::of::<T>())
            .and_then(|erased| erased.downcast_ref::<Slot<T>>())
        {
            return Arc::clone(&existing.0);
        }
        let handler = init();
        handlers.insert(
            TypeId::of::<T>(),
            Arc::new(Slot(Arc::clone(&handler))) as Arc<dyn Any + Send + Sync>,
        );
        handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Int32Handler;
    impl Serializer<i32> for Int32Handler {
        fn initialize(&mut self, _target_schema: &TypeSchema) {}
        fn serialize(&self, value: &i32, writer: &mut BufferWriter, _ctx: &mut SerializationContext) {
            writer.write_i32(*value);
        }
        fn deserialize(
            &self,
            reader: &mut BufferReader,
            _ctx: &mut DeserializationContext<i32>,
        ) -> SerializeResult<i32> {
            Ok(reader.read_i32()?)
        }
        fn clone_value(&self, source: &i32) -> i32 {
            *source
        }
        fn clear(&self, value: &mut i32) {
            *value = 0;
        }
        fn is_clear_required(&self) -> bool {
            false
        }
    }

    #[test]
    fn get_or_init_caches_single_instance() {
        let registry = HandlerRegistry::new();
        let calls = std::sync::atomic::AtomicUsize::new(0);
        for _ in 0..5 {
            registry.get_or_init::<i32>(|| {
                calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Arc::new(Int32Handler)
            });
        }
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn round_trip_through_registered_handler() {
        let registry = HandlerRegistry::new();
        let handler = registry.get_or_init::<i32>(|| Arc::new(Int32Handler));
        let mut writer = BufferWriter::new();
        let mut ctx = SerializationContext::new();
        handler.serialize(&42, &mut writer, &mut ctx);
        let bytes = writer.into_vec();
        let mut reader = BufferReader::new(&bytes);
        let mut dctx = DeserializationContext::new();
        assert_eq!(handler.deserialize(&mut reader, &mut dctx).unwrap(), 42);
    }
}
