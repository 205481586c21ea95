use thiserror::Error;

/// Errors raised by the region extraction core.
///
/// Every failure in the core is a malformed input: bad dimensions, an
/// unexpected channel layout or geometry that does not fit the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RegionError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, RegionError>;
