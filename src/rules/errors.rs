use thiserror::Error;

use crate::host::HostError;

/// Errors that can arise while applying rules or touching persisted world state.
#[derive(Debug, Error)]
pub enum RulesError {
    /// Wrapper around failures reported by the host.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 encoding error in a stored key
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Giver cannot cover the requested transfer
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },
}

impl From<RulesError> for HostError {
    fn from(err: RulesError) -> Self {
        match err {
            RulesError::Host(inner) => inner,
            other => HostError::Storage(other.to_string()),
        }
    }
}
