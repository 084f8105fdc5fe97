//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] used by the
//! configuration layer and the Solana integration crate. It follows the
//! `thiserror` pattern for ergonomic error handling.
//!
//! Wallet-session errors have their own taxonomy in `lib-wallet`; `AppError`
//! covers the ambient concerns (configuration, RPC, wire decoding).

use thiserror::Error;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type covering configuration and integration failures.
///
/// Each variant includes a descriptive `String` for context. The `#[error]`
/// attribute from `thiserror` provides the `Display` implementation.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error during startup or environment loading.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Solana RPC client error (network, rate limit, node issues).
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Transaction error (submission rejected, on-chain failure, expiry).
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Data decoding error (base58, base64, bincode deserialization).
    #[error("Decoding error: {0}")]
    Decoding(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decoding(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_context() {
        let err = AppError::Rpc("connection refused".to_string());
        assert_eq!(err.to_string(), "RPC error: connection refused");
    }

    #[test]
    fn test_json_error_converts_to_decoding() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AppError = json_err.into();
        assert!(matches!(err, AppError::Decoding(_)));
    }
}
