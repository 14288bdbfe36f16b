use crate::context::{DeserializationContext, SerializationContext};
use crate::error::{SerializeError, SerializeResult};
use crate::handler::Serializer;
use crate::schema::TypeSchema;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tb_buffer::{BufferReader, BufferWriter};

/// Wraps a family of per-version serializers for one type, dispatching to
/// the version matching the *target* schema (the one read from a store)
/// at `initialize` time. Writes always use the latest version; reads
/// accept any version `1..=latest` that has a registered implementation.
pub struct BackCompatSerializer<T> {
    latest_version: u32,
    versions: HashMap<u32, Arc<dyn Serializer<T>>>,
    active: RwLock<Option<Arc<dyn Serializer<T>>>>,
}

impl<T> BackCompatSerializer<T> {
    #[must_use]
    pub fn new(latest_version: u32, versions: HashMap<u32, Arc<dyn Serializer<T>>>) -> Self {
        BackCompatSerializer {
            latest_version,
            versions,
            active: RwLock::new(None),
        }
    }

    fn latest(&self) -> &Arc<dyn Serializer<T>> {
        self.versions
            .get(&self.latest_version)
            .expect("latest version must have a registered serializer")
    }
}

impl<T> Serializer<T> for BackCompatSerializer<T> {
    fn initialize(&mut self, target_schema: &TypeSchema) {
        let chosen = self
            .versions
            .get(&target_schema.version)
            .or_else(|| self.versions.get(&self.latest_version))
            .cloned();
        *self.active.write().unwrap() = chosen;
    }

    fn serialize(&self, value: &T, writer: &mut BufferWriter, ctx: &mut SerializationContext) {
        self.latest().serialize(value, writer, ctx);
    }

    fn deserialize(
        &self,
        reader: &mut BufferReader,
        ctx: &mut DeserializationContext<T>,
    ) -> SerializeResult<T> {
        let guard = self.active.read().unwrap();
        let handler = guard
            .as_ref()
            .ok_or(SerializeError::UnsupportedVersion(0))?;
        let _ = handler.prepare_deserialize_target(None);
        handler.deserialize(reader, ctx)
    }

    fn clone_value(&self, source: &T) -> T {
        let _ = self.latest().prepare_clone_target(None);
        self.latest().clone_value(source)
    }

    fn clear(&self, value: &mut T) {
        self.latest().clear(value);
    }

    fn prepare_deserialize_target(&self, target: Option<T>) -> Option<T> {
        let guard = self.active.read().unwrap();
        match guard.as_ref() {
            Some(handler) => handler.prepare_deserialize_target(target),
            None => target,
        }
    }

    fn prepare_clone_target(&self, target: Option<T>) -> Option<T> {
        self.latest().prepare_clone_target(target)
    }

    fn is_clear_required(&self) -> bool {
        self.latest().is_clear_required()
    }
}
