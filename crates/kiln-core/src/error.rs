//! Error types for kiln-core.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in KILN core primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid address format.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid amount (overflow or out of range).
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Wallet error.
    #[error("wallet error: {0}")]
    Wallet(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_address_display() {
        let err = CoreError::InvalidAddress("not base58".to_string());
        assert!(err.to_string().contains("not base58"));
    }

    #[test]
    fn invalid_amount_display() {
        let err = CoreError::InvalidAmount("negative".to_string());
        assert!(err.to_string().contains("negative"));
    }
}
