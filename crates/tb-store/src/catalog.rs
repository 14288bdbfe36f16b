use crate::error::{StoreError, StoreResult};
use bitflags::bitflags;
use tb_buffer::{BufferReader, BufferWriter, DateTime};

bitflags! {
    /// Stream metadata custom flags, 16 bits wide on the wire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StreamFlags: u16 {
        const NOT_PERSISTED = 0x01;
        const CLOSED = 0x02;
        const INDEXED = 0x04;
        const POLYMORPHIC = 0x08;
    }
}

const KIND_STREAM_METADATA: u16 = 0;
const KIND_RUNTIME_INFO: u16 = 1;
const KIND_TYPE_SCHEMA: u16 = 2;

/// The header shared by every catalog entry kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogHeader {
    pub name: String,
    pub id: i32,
    pub type_name: Option<String>,
    pub version: i32,
    pub serializer_name: Option<String>,
    pub serialization_system_version: i32,
    pub custom_flags: StreamFlags,
}

impl CatalogHeader {
    fn write(&self, w: &mut BufferWriter) {
        w.write_string(Some(&self.name));
        w.write_i32(self.id);
        w.write_string(self.type_name.as_deref());
        w.write_i32(self.version);
        w.write_string(self.serializer_name.as_deref());
        w.write_i32(self.serialization_system_version);
        w.write_u16(self.custom_flags.bits());
    }

    fn read(r: &mut BufferReader<'_>) -> StoreResult<Self> {
        let name = r.read_string()?.ok_or_else(|| StoreError::DeserializeFailure("catalog entry missing name".into()))?;
        let id = r.read_i32()?;
        let type_name = r.read_string()?;
        let version = r.read_i32()?;
        let serializer_name = r.read_string()?;
        let serialization_system_version = r.read_i32()?;
        let custom_flags = StreamFlags::from_bits_truncate(r.read_u16()?);
        Ok(CatalogHeader {
            name,
            id,
            type_name,
            version,
            serializer_name,
            serialization_system_version,
            custom_flags,
        })
    }
}

/// Stream open/close times, cumulative counters, and optional supplemental
/// bytes (e.g. a serialized codec-specific footer).
#[derive(Debug, Clone, PartialEq)]
pub struct StreamMetadata {
    pub header: CatalogHeader,
    pub open_time: DateTime,
    pub close_time: Option<DateTime>,
    pub message_count: u64,
    pub total_size_bytes: u64,
    pub total_latency_ticks: i64,
    pub first_originating_time: Option<DateTime>,
    pub last_originating_time: Option<DateTime>,
    pub first_creation_time: Option<DateTime>,
    pub last_creation_time: Option<DateTime>,
    pub supplemental: Option<Vec<u8>>,
}

/// Machine/process provenance for a recording: the producing host,
/// the serializer system version, and any free-form notes.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeInfo {
    pub header: CatalogHeader,
    pub machine_name: String,
    pub created_at: DateTime,
}

/// A member's field schema, flattened for the wire: name, type flags, id.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchemaEntry {
    pub header: CatalogHeader,
    pub members: Vec<(String, u32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntry {
    StreamMetadata(StreamMetadata),
    RuntimeInfo(RuntimeInfo),
    TypeSchema(TypeSchemaEntry),
}

impl CatalogEntry {
    fn header(&self) -> &CatalogHeader {
        match self {
            CatalogEntry::StreamMetadata(m) => &m.header,
            CatalogEntry::RuntimeInfo(m) => &m.header,
            CatalogEntry::TypeSchema(m) => &m.header,
        }
    }

    fn kind(&self) -> u16 {
        match self {
            CatalogEntry::StreamMetadata(_) => KIND_STREAM_METADATA,
            CatalogEntry::RuntimeInfo(_) => KIND_RUNTIME_INFO,
            CatalogEntry::TypeSchema(_) => KIND_TYPE_SCHEMA,
        }
    }

    fn write_optional_datetime(w: &mut BufferWriter, t: Option<DateTime>) {
        w.write_bool(t.is_some());
        w.write_datetime(t.unwrap_or(DateTime::from_ticks(0)));
    }

    fn read_optional_datetime(r: &mut BufferReader<'_>) -> StoreResult<Option<DateTime>> {
        let present = r.read_bool()?;
        let t = r.read_datetime()?;
        Ok(if present { Some(t) } else { None })
    }

    /// Writes the length-prefixed record: a 32-bit byte length, then the
    /// shared header, the `kind` tag, and the kind-specific body.
    pub fn write(&self, w: &mut BufferWriter) {
        let mut body = BufferWriter::new();
        self.header().write(&mut body);
        body.write_u16(self.kind());
        match self {
            CatalogEntry::StreamMetadata(m) => {
                body.write_datetime(m.open_time);
                Self::write_optional_datetime(&mut body, m.close_time);
                body.write_u64(m.message_count);
                body.write_u64(m.total_size_bytes);
                body.write_i64(m.total_latency_ticks);
                Self::write_optional_datetime(&mut body, m.first_originating_time);
                Self::write_optional_datetime(&mut body, m.last_originating_time);
                Self::write_optional_datetime(&mut body, m.first_creation_time);
                Self::write_optional_datetime(&mut body, m.last_creation_time);
                match &m.supplemental {
                    None => body.write_i32(-1),
                    Some(bytes) => {
                        body.write_i32(bytes.len() as i32);
                        body.write_bytes(bytes);
                    }
                }
            }
            CatalogEntry::RuntimeInfo(m) => {
                body.write_string(Some(&m.machine_name));
                body.write_datetime(m.created_at);
            }
            CatalogEntry::TypeSchema(m) => {
                body.write_i32(m.members.len() as i32);
                for (name, flags) in &m.members {
                    body.write_string(Some(name));
                    body.write_u32(*flags);
                }
            }
        }
        let bytes = body.into_vec();
        w.write_i32(bytes.len() as i32);
        w.write_bytes(&bytes);
    }

    /// Reads one length-prefixed record. Returns `Ok(None)` for the
    /// zero-length "intermission" marker that terminates a catalog batch.
    pub fn read(r: &mut BufferReader<'_>) -> StoreResult<Option<Self>> {
        let len = r.read_i32()?;
        if len == 0 {
            return Ok(None);
        }
        if len < 0 {
            return Err(StoreError::DeserializeFailure(format!("negative catalog record length {len}")));
        }
        let mut body_bytes = vec![0u8; len as usize];
        r.read_bytes(&mut body_bytes)?;
        let mut body = BufferReader::new(&body_bytes);
        let header = CatalogHeader::read(&mut body)?;
        let kind = body.read_u16()?;
        let entry = match kind {
            KIND_STREAM_METADATA => {
                let open_time = body.read_datetime()?;
                let close_time = Self::read_optional_datetime(&mut body)?;
                let message_count = body.read_u64()?;
                let total_size_bytes = body.read_u64()?;
                let total_latency_ticks = body.read_i64()?;
                let first_originating_time = Self::read_optional_datetime(&mut body)?;
                let last_originating_time = Self::read_optional_datetime(&mut body)?;
                let first_creation_time = Self::read_optional_datetime(&mut body)?;
                let last_creation_time = Self::read_optional_datetime(&mut body)?;
                let supp_len = body.read_i32()?;
                let supplemental = if supp_len < 0 {
                    None
                } else {
                    let mut bytes = vec![0u8; supp_len as usize];
                    body.read_bytes(&mut bytes)?;
                    Some(bytes)
                };
                CatalogEntry::StreamMetadata(StreamMetadata {
                    header,
                    open_time,
                    close_time,
                    message_count,
                    total_size_bytes,
                    total_latency_ticks,
                    first_originating_time,
                    last_originating_time,
                    first_creation_time,
                    last_creation_time,
                    supplemental,
                })
            }
            KIND_RUNTIME_INFO => {
                let machine_name = body.read_string()?.ok_or_else(|| StoreError::DeserializeFailure("runtime info missing machine name".into()))?;
                let created_at = body.read_datetime()?;
                CatalogEntry::RuntimeInfo(RuntimeInfo {
                    header,
                    machine_name,
                    created_at,
                })
            }
            KIND_TYPE_SCHEMA => {
                let count = body.read_i32()?;
                let mut members = Vec::with_capacity(count.max(0) as usize);
                for _ in 0..count {
                    let name = body.read_string()?.ok_or_else(|| StoreError::DeserializeFailure("type schema member missing name".into()))?;
                    let flags = body.read_u32()?;
                    members.push((name, flags));
                }
                CatalogEntry::TypeSchema(TypeSchemaEntry { header, members })
            }
            other => return Err(StoreError::UnknownCatalogKind(other)),
        };
        Ok(Some(entry))
    }
}
