use std::collections::HashMap;
use tracing::{debug, trace};

/// The shape category of a serializable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFlags {
    Class,
    Struct,
    Collection,
    Contract,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSchema {
    pub name: String,
    pub type_name: String,
    pub required: bool,
}

/// A type's wire schema: its shape, member list, and versioning metadata.
///
/// `id` is a positive 31-bit hash of `contract_name` (the top bit is
/// always cleared, matching the source's `id = hash(name) | high-bit,
/// then cleared` scheme, which exists only to keep ids in the positive
/// `i32` range for storage alongside other signed record ids).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchema {
    pub contract_name: String,
    pub id: i32,
    pub type_name: String,
    pub flags: TypeFlags,
    pub members: Vec<MemberSchema>,
    pub version: u32,
    pub serializer_type_name: String,
    pub serialization_system_version: u32,
}

impl TypeSchema {
    #[must_use]
    pub fn new(
        contract_name: impl Into<String>,
        type_name: impl Into<String>,
        flags: TypeFlags,
        members: Vec<MemberSchema>,
        version: u32,
        serializer_type_name: impl Into<String>,
    ) -> Self {
        let contract_name = contract_name.into();
        let id = schema_id_for(&contract_name);
        TypeSchema {
            contract_name,
            id,
            type_name: type_name.into(),
            flags,
            members,
            version,
            serializer_type_name: serializer_type_name.into(),
            serialization_system_version: 1,
        }
    }
}

/// Derives a stable, positive 31-bit schema id from a contract name by
/// hashing it and clearing the sign bit.
#[must_use]
pub fn schema_id_for(contract_name: &str) -> i32 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in contract_name.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
    }
    (hash as i32) & 0x7fff_ffff
}

/// Three-source schema catalog: explicit code-side declaration, runtime
/// reflection, or a persisted schema embedded in a store/remote catalog.
/// When multiple sources disagree, the *target* schema (the one the
/// catalog was seeded with, e.g. from a store being read) wins and is
/// never silently overwritten by a later `register` call for the same
/// contract name at a different version.
#[derive(Debug, Default)]
pub struct SchemaCatalog {
    by_name: HashMap<String, TypeSchema>,
    by_id: HashMap<i32, TypeSchema>,
}

impl SchemaCatalog {
    #[must_use]
    pub fn new() -> Self {
        SchemaCatalog::default()
    }

    /// Registers `schema`, unless a schema for the same contract name is
    /// already present — the first (target) schema wins.
    pub fn register(&mut self, schema: TypeSchema) {
        if self.by_name.contains_key(&schema.contract_name) {
            debug!(contract = schema.contract_name, "schema already present, keeping target's version");
            return;
        }
        trace!(contract = schema.contract_name, version = schema.version, "schema registered");
        self.by_id.insert(schema.id, schema.clone());
        self.by_name.insert(schema.contract_name.clone(), schema);
    }

    /// Unconditionally replaces any existing schema for the contract name,
    /// used when loading a persisted/target schema that must take
    /// precedence over a reflection-derived default.
    pub fn register_as_target(&mut self, schema: TypeSchema) {
        if let Some(existing) = self.by_name.get(&schema.contract_name) {
            debug!(
                contract = schema.contract_name,
                previous_version = existing.version,
                target_version = schema.version,
                "target schema overriding previously registered schema"
            );
        }
        self.by_id.insert(schema.id, schema.clone());
        self.by_name.insert(schema.contract_name.clone(), schema);
    }

    #[must_use]
    pub fn by_name(&self, contract_name: &str) -> Option<&TypeSchema> {
        self.by_name.get(contract_name)
    }

    #[must_use]
    pub fn by_id(&self, id: i32) -> Option<&TypeSchema> {
        self.by_id.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Reconciles a runtime type's member list against a target schema read
/// from a store: members present only in the runtime type are left at
/// their defaults; members present only in the target schema are skipped.
/// Returns the ordered set of (schema member index, runtime member index)
/// pairs that both sides agree on, in target-schema order.
#[must_use]
pub fn reconcile_members(
    target: &[MemberSchema],
    runtime: &[MemberSchema],
) -> Vec<(usize, Option<usize>)> {
    target
        .iter()
        .enumerate()
        .map(|(schema_idx, member)| {
            let runtime_idx = runtime.iter().position(|m| m.name == member.name);
            (schema_idx, runtime_idx)
        })
        .collect()
}
