#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("read past end of buffer: requested {requested} bytes, {remaining} remaining")]
    ReadPastEnd { requested: usize, remaining: usize },
    #[error("string length prefix {0} is negative and not the null sentinel -1")]
    InvalidStringLength(i32),
    #[error("invalid utf-8 in string payload: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

pub type BufferResult<T> = Result<T, BufferError>;
