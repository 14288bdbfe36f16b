#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("buffer error: {0}")]
    Buffer(#[from] tb_buffer::BufferError),
    #[error("no schema registered for contract '{0}'")]
    UnknownContract(String),
    #[error("no schema registered for id {0}")]
    UnknownSchemaId(i32),
    #[error("no handler registered for contract '{0}'")]
    NoHandler(String),
    #[error("schema mismatch on contract '{contract}': {detail}")]
    SchemaMismatch { contract: String, detail: String },
    #[error("deserialization failed for contract '{contract}': {detail}")]
    DeserializeFailure { contract: String, detail: String },
    #[error("back-compat handler has no implementation registered for schema version {0}")]
    UnsupportedVersion(u32),
    #[error("reference table has no entry at index {0}")]
    DanglingReference(u32),
}

pub type SerializeResult<T> = Result<T, SerializeError>;
