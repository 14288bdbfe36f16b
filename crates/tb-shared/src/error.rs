#[derive(Debug, thiserror::Error)]
pub enum SharedError {
    #[error("shared resource released more times than it was acquired")]
    DoubleFree { location: Option<String> },
    #[error("shared resource accessed after its final release")]
    UseAfterFree { location: Option<String> },
    #[error(
        "pool reset requested without clear_live, but {live} of {total} instances are still outstanding"
    )]
    PoolHasLiveObjects { live: usize, total: usize },
}

impl SharedError {
    /// The debug-build call-stack location captured at the point of
    /// failure, when available.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            SharedError::DoubleFree { location } | SharedError::UseAfterFree { location } => {
                location.as_deref()
            }
            SharedError::PoolHasLiveObjects { .. } => None,
        }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;

/// Captures the caller's source location in debug builds only, for
/// inclusion in `DoubleFree`/`UseAfterFree` diagnostics. A release build
/// returns `None` so there is no runtime cost outside debug builds.
#[track_caller]
pub(crate) fn caller_location() -> Option<String> {
    if cfg!(debug_assertions) {
        let loc = std::panic::Location::caller();
        Some(format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
    } else {
        None
    }
}
