use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}: expected exactly 2 whitespace-separated tokens, found {found}")]
    Parse { line: usize, found: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// A walk or a propagation step reached a node that never appears as a source.
    #[error("node `{0}` is not a known node (it has no recorded out-edges)")]
    DanglingNode(String),

    #[error("known node `{0}` has out-degree 0")]
    ZeroOutDegree(String),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}
