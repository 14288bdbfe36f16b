use crate::error::SerializeResult;
use crate::handler::Serializer;
use std::collections::HashMap;
use tb_buffer::BufferReader;

/// The polymorphic ref envelope prefix every reference-typed field (and
/// every top-level string) carries on the wire. Structs are never
/// ref-wrapped; collection elements carry whatever envelope their own
/// type requires, not an extra one for the collection itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefPrefix {
    Null,
    /// An already-serialized reference; the payload is just this index
    /// into the context's object table.
    Existing(u32),
    /// A new instance of a type other than the field's declared type; the
    /// low bits are the handler/schema id to dispatch on.
    NewDerived(u32),
    /// A new instance of exactly the field's declared type.
    NewDeclared,
}

const TAG_NULL: u32 = 0b00 << 30;
const TAG_EXISTING: u32 = 0b01 << 30;
const TAG_DERIVED: u32 = 0b10 << 30;
const TAG_DECLARED: u32 = 0b11 << 30;
const LOW_MASK: u32 = 0x3fff_ffff;

impl RefPrefix {
    #[must_use]
    pub fn encode(self) -> u32 {
        match self {
            RefPrefix::Null => TAG_NULL,
            RefPrefix::Existing(idx) => TAG_EXISTING | (idx & LOW_MASK),
            RefPrefix::NewDerived(id) => TAG_DERIVED | (id & LOW_MASK),
            RefPrefix::NewDeclared => TAG_DECLARED,
        }
    }

    #[must_use]
    pub fn decode(raw: u32) -> RefPrefix {
        let low = raw & LOW_MASK;
        match raw & !LOW_MASK {
            TAG_NULL => RefPrefix::Null,
            TAG_EXISTING => RefPrefix::Existing(low),
            TAG_DERIVED => RefPrefix::NewDerived(low),
            _ => RefPrefix::NewDeclared,
        }
    }
}

/// Assigns sequential ids to newly-serialized references within one
/// serialize call's object graph, keyed by a caller-supplied identity
/// (e.g. a pointer address or arena index) so that shared references and
/// cycles serialize once and replay as `Existing` thereafter.
#[derive(Debug, Default)]
pub struct SerializationContext {
    next_id: u32,
    assigned: HashMap<u64, u32>,
}

pub enum RefAssignment {
    /// First time this identity is seen in this graph: caller should write
    /// `NewDeclared`/`NewDerived` and then serialize the payload.
    New(u32),
    /// Already serialized earlier in this graph: caller should write
    /// `Existing(id)` and skip the payload entirely.
    Existing(u32),
}

impl SerializationContext {
    #[must_use]
    pub fn new() -> Self {
        SerializationContext::default()
    }

    pub fn assign(&mut self, identity: u64) -> RefAssignment {
        if let Some(&id) = self.assigned.get(&identity) {
            return RefAssignment::Existing(id);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.assigned.insert(identity, id);
        RefAssignment::New(id)
    }
}

/// The deserialize-side counterpart: a table of reconstructed references
/// indexed by the same sequential numbering the serialize side assigned,
/// so that forward references within a single object graph resolve once
/// their target is deserialized — each reference is numbered at first
/// emission, before its payload, so the table slot exists (as `None`)
/// before it's filled in.
#[derive(Debug)]
pub struct DeserializationContext<T> {
    table: Vec<Option<T>>,
}

impl<T> Default for DeserializationContext<T> {
    fn default() -> Self {
        DeserializationContext { table: Vec::new() }
    }
}

impl<T> DeserializationContext<T> {
    #[must_use]
    pub fn new() -> Self {
        DeserializationContext::default()
    }

    /// Reserves the next slot (for a reference about to be deserialized)
    /// and returns its id.
    pub fn reserve(&mut self) -> u32 {
        self.table.push(None);
        (self.table.len() - 1) as u32
    }

    pub fn fill(&mut self, id: u32, value: T) {
        self.table[id as usize] = Some(value);
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&T> {
        self.table.get(id as usize).and_then(Option::as_ref)
    }

    /// Deserializes one value via `handler`, first giving it a chance to
    /// prepare `recycled` (typically a pooled instance) as the in-place
    /// target instead of always allocating fresh.
    pub fn deserialize_with(
        &mut self,
        handler: &dyn Serializer<T>,
        reader: &mut BufferReader,
        recycled: Option<T>,
    ) -> SerializeResult<T> {
        let _ = handler.prepare_deserialize_target(recycled);
        handler.deserialize(reader, self)
    }
}

/// Clone-side counterpart to `SerializationContext`/`DeserializationContext`:
/// cloning skips the buffer codec entirely but must preserve the same
/// shared/cyclic reference structure, so it needs both halves at once — the
/// identity lookup `SerializationContext` keeps, and the resolved-value
/// table `DeserializationContext` keeps.
#[derive(Debug)]
pub struct CloneContext<T> {
    next_id: u32,
    assigned: HashMap<u64, u32>,
    table: Vec<Option<T>>,
}

impl<T> Default for CloneContext<T> {
    fn default() -> Self {
        CloneContext {
            next_id: 0,
            assigned: HashMap::new(),
            table: Vec::new(),
        }
    }
}

impl<T> CloneContext<T> {
    #[must_use]
    pub fn new() -> Self {
        CloneContext::default()
    }

    fn assign(&mut self, identity: u64) -> RefAssignment {
        if let Some(&id) = self.assigned.get(&identity) {
            return RefAssignment::Existing(id);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.assigned.insert(identity, id);
        self.table.push(None);
        RefAssignment::New(id)
    }

    fn fill(&mut self, id: u32, value: T) {
        self.table[id as usize] = Some(value);
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&T> {
        self.table.get(id as usize).and_then(Option::as_ref)
    }

    /// Clones one value via `handler`, preserving shared-reference identity
    /// across the same clone graph: visiting the same `identity` twice
    /// returns the same cloned instance instead of diverging into two
    /// independent copies.
    pub fn clone_with(&mut self, handler: &dyn Serializer<T>, identity: u64, source: &T, recycled: Option<T>) -> T
    where
        T: Clone,
    {
        match self.assign(identity) {
            RefAssignment::Existing(id) => self
                .get(id)
                .cloned()
                .expect("existing ref must have been filled before being looked up again"),
            RefAssignment::New(id) => {
                let _ = handler.prepare_clone_target(recycled);
                let cloned = handler.clone_value(source);
                self.fill(id, cloned.clone());
                cloned
            }
        }
    }
}
