//! # Wallet Error Handling
//!
//! Error taxonomy for the wallet session. Every variant is observable by the
//! caller as a distinct failure; nothing is retried or swallowed here, with
//! one exception: deauthorization failures during disconnect are best-effort
//! and only logged, so they have no variant.

use thiserror::Error;

/// Convenience type alias for `Result<T, WalletError>`.
pub type Result<T> = std::result::Result<T, WalletError>;

/// Wallet session error type.
#[derive(Debug, Error)]
pub enum WalletError {
    /// A privileged operation was invoked without a connected session.
    #[error("Wallet not connected")]
    NotConnected,

    /// The wallet declined the initial authorization request, or the
    /// transport channel could not be opened.
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// A previously valid auth token was rejected on refresh (revoked
    /// externally, wallet uninstalled, ...).
    #[error("Reauthorization failed: {0}")]
    ReauthorizationFailed(String),

    /// A sign or send exchange failed after successful (re)authorization.
    #[error("Wallet operation failed: {0}")]
    TransportOperationFailed(String),

    /// An RPC call (blockhash fetch, submit, confirm, balance) failed.
    #[error("Network error: {0}")]
    Network(String),

    /// A transaction could not be converted to or from the wire format.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(WalletError::NotConnected.to_string(), "Wallet not connected");
        assert_eq!(
            WalletError::ReauthorizationFailed("token revoked".to_string()).to_string(),
            "Reauthorization failed: token revoked"
        );
    }
}
