//! # Wallet Transport Seam
//!
//! Traits for the wallet-authorization channel, enabling dependency injection
//! and mocking in tests. The concrete transport (the platform wallet-adapter
//! binding) is supplied by the embedding application; this crate only defines
//! the exchange surface it relies on.
//!
//! The channel is exclusive: one exchange sequence at a time per process.
//! Serialization of concurrent opens (queueing or failing) is the transport's
//! own contract and is not overridden here.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use lib_core::Config;

use crate::transaction::SupportedTransaction;

/// Errors surfaced by a wallet transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The wallet endpoint is unreachable or the channel could not be opened.
    #[error("wallet transport unavailable: {0}")]
    Unavailable(String),

    /// The wallet (or the user) declined the request.
    #[error("request declined by wallet: {0}")]
    Declined(String),

    /// An exchange failed at the protocol level after the channel was open.
    #[error("wallet protocol error: {0}")]
    Protocol(String),
}

/// Application identity presented to wallets in authorization prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppIdentity {
    pub name: String,
    pub uri: String,
    pub icon: String,
}

impl AppIdentity {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.app_name.clone(),
            uri: config.app_uri.clone(),
            icon: config.app_icon.clone(),
        }
    }
}

/// A single account the wallet granted access to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedAccount {
    /// Base58-encoded account address
    pub address: String,
    /// Wallet-provided display label, if any
    pub label: Option<String>,
}

/// Result of a successful authorize exchange.
#[derive(Debug, Clone)]
pub struct AuthorizationResult {
    /// Accounts granted to the app; the first is treated as the active account
    pub accounts: Vec<AuthorizedAccount>,
    /// Opaque credential for subsequent reauthorize/deauthorize exchanges
    pub auth_token: String,
    /// Base URI identifying the wallet application, if advertised
    pub wallet_uri_base: Option<String>,
}

/// Factory for wallet-transport channels.
///
/// This trait allows for dependency injection and mocking in tests.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    type Channel: WalletChannel;

    /// Open the exclusive channel to the wallet application.
    async fn open(&self) -> Result<Self::Channel, TransportError>;
}

/// One open channel to a wallet application.
///
/// All exchanges happen within the scope of a single open channel; callers
/// invoke [`close`](Self::close) on every exit path once done.
#[async_trait]
pub trait WalletChannel: Send {
    /// Request authorization for the given cluster, presenting the app identity.
    async fn authorize(
        &mut self,
        cluster: &str,
        identity: &AppIdentity,
    ) -> Result<AuthorizationResult, TransportError>;

    /// Refresh an existing authorization without a full re-approval prompt.
    ///
    /// A returned refreshed token is only valid for the remainder of this
    /// channel; callers never persist it.
    async fn reauthorize(
        &mut self,
        auth_token: &str,
        identity: &AppIdentity,
    ) -> Result<Option<String>, TransportError>;

    /// Invalidate an auth token with the wallet.
    async fn deauthorize(&mut self, auth_token: &str) -> Result<(), TransportError>;

    /// Request signatures for an ordered batch of transactions.
    ///
    /// The result is positional: slot `i` of the output is the signed form of
    /// slot `i` of the input.
    async fn sign_transactions(
        &mut self,
        transactions: Vec<SupportedTransaction>,
    ) -> Result<Vec<SupportedTransaction>, TransportError>;

    /// Request detached signatures over opaque payloads for the given addresses.
    async fn sign_messages(
        &mut self,
        addresses: &[String],
        payloads: &[Vec<u8>],
    ) -> Result<Vec<Vec<u8>>, TransportError>;

    /// Combined sign-and-submit exchange; returns base58 transaction signatures.
    async fn sign_and_send_transactions(
        &mut self,
        transactions: Vec<SupportedTransaction>,
    ) -> Result<Vec<String>, TransportError>;

    /// Close the channel. Failures are logged by callers, never propagated.
    async fn close(&mut self) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_config() {
        let config = Config::default();
        let identity = AppIdentity::from_config(&config);
        assert_eq!(identity.name, config.app_name);
        assert_eq!(identity.uri, config.app_uri);
        assert_eq!(identity.icon, config.app_icon);
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Declined("user dismissed the prompt".to_string());
        assert_eq!(
            err.to_string(),
            "request declined by wallet: user dismissed the prompt"
        );
    }
}
