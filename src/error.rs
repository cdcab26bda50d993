use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Construction-time configuration outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A cached attribute was read before the forward/backward call that sets it.
    #[error("`{0}` is not set yet")]
    UnsetState(&'static str),

    #[error("{context}: expected shape {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub(crate) fn shape(context: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        Error::ShapeMismatch {
            context,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}
