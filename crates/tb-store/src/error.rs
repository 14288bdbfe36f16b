#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Buffer(#[from] tb_buffer::BufferError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("deserialize failure on a single record: {0}")]
    DeserializeFailure(String),
    #[error("protocol version mismatch: expected {expected}, got {actual}")]
    ProtocolVersionMismatch { expected: i16, actual: i16 },
    #[error("more than one machine in this federation claims to be the primary clock source")]
    MultiplePrimaryClocks,
    #[error("catalog entry kind {0} is not recognized")]
    UnknownCatalogKind(u16),
}

pub type StoreResult<T> = Result<T, StoreError>;
