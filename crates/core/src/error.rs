/// Coarse classification of a [`CoreError`].
///
/// Used at the service boundary to pick an HTTP status and by operators to
/// tell "it never started" (transport) apart from "it never finished"
/// (timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Transport,
    Protocol,
    Timeout,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A request field is missing or malformed. Never retried.
    #[error("{0}")]
    Validation(String),

    /// A referenced input or template does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A network or remote service call failed.
    #[error("{0}")]
    Transport(String),

    /// A remote service answered successfully but broke its contract.
    #[error("{0}")]
    Protocol(String),

    /// The wait budget was exhausted before the job reached a terminal state.
    #[error("{0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::Transport(_) => ErrorKind::Transport,
            CoreError::Protocol(_) => ErrorKind::Protocol,
            CoreError::Timeout(_) => ErrorKind::Timeout,
            CoreError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(err.to_string()),
            _ => CoreError::Internal(err.to_string()),
        }
    }
}
