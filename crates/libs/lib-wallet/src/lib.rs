//! # Wallet Library
//!
//! Wallet-adapter session management for the mobile app: the authorization
//! lifecycle against an external wallet application, and transaction
//! signing/submission through it.
//!
//! The wallet application itself is reached through the [`transport`] traits;
//! the network is reached through the [`service::RpcService`] seam. Both are
//! injected into [`WalletContext`], which owns the session state and enforces
//! the reauthorize-before-operate sequencing on every privileged call.

pub mod context;
pub mod error;
pub mod service;
pub mod session;
pub mod transaction;
pub mod transport;

#[cfg(any(test, feature = "mock-wallet"))]
pub mod mock;

// Re-export commonly used types
pub use context::{WalletBalance, WalletContext};
pub use error::WalletError;
pub use service::RpcService;
pub use session::WalletSession;
pub use transaction::SupportedTransaction;
pub use transport::{
    AppIdentity, AuthorizationResult, AuthorizedAccount, TransportError, WalletChannel,
    WalletConnector,
};
