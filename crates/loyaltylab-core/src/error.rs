use thiserror::Error;

pub type LoyaltyResult<T> = Result<T, LoyaltyError>;

/// Errors surfaced to callers of the loyalty API.
///
/// Every error is terminal to the call that raised it. Only
/// [`LoyaltyError::Connection`] is transient and worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoyaltyError {
    /// The transport failed (timeout, refused connection, DNS) and the
    /// configured retries were exhausted.
    #[error("connection error: {0}")]
    Connection(String),

    /// Credentials were rejected, either by a fault code or by an
    /// authentication response with `Authenticated = false`.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Any other service fault, including fault bodies that could not be parsed.
    #[error("unknown error: {0}")]
    Unknown(String),

    /// The client could not be constructed from its configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LoyaltyError {
    pub fn is_transient(&self) -> bool {
        matches!(self, LoyaltyError::Connection(_))
    }

    /// The human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            LoyaltyError::Connection(msg)
            | LoyaltyError::Authentication(msg)
            | LoyaltyError::Unknown(msg)
            | LoyaltyError::InvalidConfig(msg) => msg,
        }
    }
}
