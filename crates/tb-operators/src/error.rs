#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    #[error("dynamic window obsolete time went backwards")]
    NonMonotonicObsolete,
}

pub type OperatorResult<T> = Result<T, OperatorError>;
