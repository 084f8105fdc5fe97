//! # Wallet Context
//!
//! The session controller: owns the wallet authorization state and mediates
//! every privileged operation through the wallet transport and the RPC seam.
//!
//! ## Overview
//!
//! - **Connect / Disconnect**: full authorization lifecycle against the wallet
//!   application, with best-effort deauthorization on disconnect
//! - **Reauthorize-then-operate**: every signing/sending call refreshes the
//!   session on the open channel before the operation runs
//! - **Sign & Send**: single combined wallet exchange (preferred) or the
//!   two-step sign-then-submit path for wallets without the combined call
//!
//! The context is created once and handed to consumers explicitly; it is
//! cheap to share behind an `Arc`.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use lib_core::Config;
//! # use lib_solana::SolanaConnection;
//! # use lib_wallet::{WalletContext, WalletConnector};
//! # async fn example<C: WalletConnector>(connector: C) -> Result<(), lib_wallet::WalletError> {
//! let config = Config::from_env().expect("invalid configuration");
//! let connection = Arc::new(SolanaConnection::from_config(&config));
//! let wallet = WalletContext::new(&config, connector, connection);
//!
//! wallet.connect().await?;
//! println!("connected as {:?}", wallet.wallet().address());
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::{debug, info, instrument, warn};

use lib_core::{Cluster, Config};

use crate::error::WalletError;
use crate::service::RpcService;
use crate::session::WalletSession;
use crate::transaction::SupportedTransaction;
use crate::transport::{AppIdentity, WalletChannel, WalletConnector};

/// Label used when a wallet does not advertise an identity.
const UNKNOWN_WALLET_LABEL: &str = "Unknown Wallet";

/// SOL balance of the authorized account.
#[derive(Debug, Clone, Serialize)]
pub struct WalletBalance {
    /// Wallet address
    pub address: String,
    /// Balance in SOL (human-readable)
    pub balance_sol: f64,
    /// Balance in lamports (smallest unit, 1 SOL = 1B lamports)
    pub balance_lamports: u64,
}

/// The wallet session controller.
///
/// Owns the [`WalletSession`] and serializes it behind a lock; the session is
/// only ever mutated by [`connect`](Self::connect) and
/// [`disconnect`](Self::disconnect). Privileged operations read a snapshot and
/// never write back, so a failed operation leaves the session exactly as it
/// was; the caller decides whether to retry or reconnect.
pub struct WalletContext<C: WalletConnector> {
    identity: AppIdentity,
    cluster: Cluster,
    connector: C,
    rpc: Arc<dyn RpcService>,
    session: RwLock<WalletSession>,
    connecting: AtomicBool,
}

impl<C: WalletConnector> WalletContext<C> {
    /// Create a new wallet context.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration (identity fields and cluster)
    /// * `connector` - Transport used to open wallet channels
    /// * `rpc` - Network RPC seam (pass the `SolanaConnection` in production)
    pub fn new(config: &Config, connector: C, rpc: Arc<dyn RpcService>) -> Self {
        Self {
            identity: AppIdentity::from_config(config),
            cluster: config.cluster,
            connector,
            rpc,
            session: RwLock::new(WalletSession::default()),
            connecting: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current session state.
    pub fn wallet(&self) -> WalletSession {
        self.session.read().clone()
    }

    /// Whether a connect is currently in flight.
    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::SeqCst)
    }

    /// The RPC seam this context submits and confirms through.
    pub fn rpc(&self) -> &Arc<dyn RpcService> {
        &self.rpc
    }

    /// Connect to a wallet application and authorize for the configured cluster.
    ///
    /// Re-entrant calls while a connect is in flight resolve immediately
    /// without opening a second channel. On success the session transitions to
    /// connected; on failure it stays disconnected and the error propagates.
    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<(), WalletError> {
        // Re-entrancy guard: a second connect while one is in flight is a no-op.
        if self.connecting.swap(true, Ordering::SeqCst) {
            debug!("connect already in flight");
            return Ok(());
        }

        let result = self.connect_inner().await;
        self.connecting.store(false, Ordering::SeqCst);
        result
    }

    async fn connect_inner(&self) -> Result<(), WalletError> {
        let mut channel = self.connector.open().await.map_err(|e| {
            WalletError::AuthorizationFailed(format!("failed to open wallet channel: {}", e))
        })?;

        let authorization = channel.authorize(self.cluster.name(), &self.identity).await;
        close_channel(&mut channel).await;

        let authorization =
            authorization.map_err(|e| WalletError::AuthorizationFailed(e.to_string()))?;

        let account = authorization.accounts.into_iter().next().ok_or_else(|| {
            WalletError::AuthorizationFailed("wallet returned no accounts".to_string())
        })?;

        let public_key = Pubkey::from_str(&account.address).map_err(|e| {
            WalletError::AuthorizationFailed(format!(
                "invalid account address '{}': {}",
                account.address, e
            ))
        })?;

        let wallet_label = authorization
            .wallet_uri_base
            .or(account.label)
            .unwrap_or_else(|| UNKNOWN_WALLET_LABEL.to_string());

        // public_key and auth_token are replaced as a unit
        *self.session.write() = WalletSession {
            public_key: Some(public_key),
            auth_token: Some(authorization.auth_token),
            wallet_label: Some(wallet_label),
        };

        info!(address = %public_key, "wallet authorized");
        Ok(())
    }

    /// Disconnect from the wallet.
    ///
    /// Attempts a best-effort deauthorization when an auth token is present;
    /// failures there are logged and never surfaced. Local session state is
    /// cleared unconditionally. Safe to call when already disconnected.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) {
        let auth_token = self.session.read().auth_token.clone();

        if let Some(token) = auth_token {
            match self.connector.open().await {
                Ok(mut channel) => {
                    if let Err(e) = channel.deauthorize(&token).await {
                        warn!("failed to deauthorize wallet: {}", e);
                    }
                    close_channel(&mut channel).await;
                }
                Err(e) => warn!("failed to open wallet channel for deauthorization: {}", e),
            }
        }

        *self.session.write() = WalletSession::default();
        debug!("wallet session cleared");
    }

    /// Run a privileged operation on a freshly reauthorized channel.
    ///
    /// Fails with [`WalletError::NotConnected`] before opening any channel
    /// when the session is empty. Otherwise opens the channel, refreshes the
    /// authorization with the stored token, and only then hands the channel to
    /// `operation`. The channel is closed on every path. A refreshed token
    /// returned by the wallet is scoped to this channel and not persisted; the
    /// session is never mutated here, even on failure.
    pub async fn with_reauthorization<T, F>(&self, operation: F) -> Result<T, WalletError>
    where
        T: Send,
        F: for<'a> FnOnce(&'a mut C::Channel) -> BoxFuture<'a, Result<T, WalletError>> + Send,
    {
        let auth_token = {
            let session = self.session.read();
            match (&session.public_key, &session.auth_token) {
                (Some(_), Some(token)) => token.clone(),
                _ => return Err(WalletError::NotConnected),
            }
        };

        let mut channel = self.connector.open().await.map_err(|e| {
            WalletError::AuthorizationFailed(format!("failed to open wallet channel: {}", e))
        })?;

        // Reauthorization strictly precedes the wrapped operation.
        let result = match channel.reauthorize(&auth_token, &self.identity).await {
            Ok(_refreshed) => operation(&mut channel).await,
            Err(e) => Err(WalletError::ReauthorizationFailed(e.to_string())),
        };

        close_channel(&mut channel).await;
        result
    }

    /// Sign a single transaction. The input's shape (legacy vs versioned) is
    /// preserved in the returned signed transaction.
    pub async fn sign_transaction(
        &self,
        transaction: SupportedTransaction,
    ) -> Result<SupportedTransaction, WalletError> {
        self.with_reauthorization(move |wallet| {
            Box::pin(async move {
                let mut signed = wallet
                    .sign_transactions(vec![transaction])
                    .await
                    .map_err(|e| WalletError::TransportOperationFailed(e.to_string()))?;
                if signed.len() != 1 {
                    return Err(WalletError::TransportOperationFailed(format!(
                        "wallet returned {} transactions for a single sign request",
                        signed.len()
                    )));
                }
                Ok(signed.remove(0))
            })
        })
        .await
    }

    /// Sign an ordered batch of transactions in one wallet exchange.
    ///
    /// The result is positional: whatever the wallet returns in slot `i` is
    /// handed back in slot `i`. Partial success is not a defined outcome: a
    /// count mismatch from the wallet fails the whole call.
    pub async fn sign_all_transactions(
        &self,
        transactions: Vec<SupportedTransaction>,
    ) -> Result<Vec<SupportedTransaction>, WalletError> {
        let expected = transactions.len();
        self.with_reauthorization(move |wallet| {
            Box::pin(async move {
                let signed = wallet
                    .sign_transactions(transactions)
                    .await
                    .map_err(|e| WalletError::TransportOperationFailed(e.to_string()))?;
                if signed.len() != expected {
                    return Err(WalletError::TransportOperationFailed(format!(
                        "wallet signed {} of {} transactions",
                        signed.len(),
                        expected
                    )));
                }
                Ok(signed)
            })
        })
        .await
    }

    /// Request a detached signature over an opaque payload, addressed to the
    /// currently authorized account.
    pub async fn sign_message(&self, message: Vec<u8>) -> Result<Vec<u8>, WalletError> {
        let address = self
            .session
            .read()
            .address()
            .ok_or(WalletError::NotConnected)?;

        self.with_reauthorization(move |wallet| {
            Box::pin(async move {
                let mut signatures = wallet
                    .sign_messages(&[address], &[message])
                    .await
                    .map_err(|e| WalletError::TransportOperationFailed(e.to_string()))?;
                if signatures.len() != 1 {
                    return Err(WalletError::TransportOperationFailed(format!(
                        "wallet returned {} signatures for a single message",
                        signatures.len()
                    )));
                }
                Ok(signatures.remove(0))
            })
        })
        .await
    }

    /// Sign and submit a transaction in one combined wallet exchange, then
    /// confirm it on-chain. Preferred over [`send_transaction`](Self::send_transaction)
    /// because it needs a single wallet round trip.
    ///
    /// A legacy transaction is stamped with a fresh blockhash and the
    /// authorized account as fee payer before the exchange; a versioned
    /// transaction keeps the blockhash compiled into its message. The same
    /// blockhash validity window drives the confirmation.
    #[instrument(skip_all)]
    pub async fn sign_and_send_transaction(
        &self,
        mut transaction: SupportedTransaction,
    ) -> Result<String, WalletError> {
        let public_key = self.connected_public_key()?;

        let latest = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(WalletError::Network)?;

        if !transaction.is_versioned() {
            transaction.ensure_fee_payer(&public_key);
            transaction.set_recent_blockhash(latest.blockhash);
        }

        let signatures = self
            .with_reauthorization(move |wallet| {
                Box::pin(async move {
                    wallet
                        .sign_and_send_transactions(vec![transaction])
                        .await
                        .map_err(|e| WalletError::TransportOperationFailed(e.to_string()))
                })
            })
            .await?;

        let signature = signatures.into_iter().next().ok_or_else(|| {
            WalletError::TransportOperationFailed("wallet returned no signature".to_string())
        })?;

        let parsed = Signature::from_str(&signature).map_err(|e| {
            WalletError::TransportOperationFailed(format!(
                "invalid signature '{}': {}",
                signature, e
            ))
        })?;

        self.rpc
            .confirm_transaction(&parsed, latest.last_valid_block_height)
            .await
            .map_err(WalletError::Network)?;

        debug!(%signature, "transaction confirmed");
        Ok(signature)
    }

    /// Sign, then submit the raw wire bytes through the RPC node, then
    /// confirm. Two separate exchanges instead of the combined call; kept for
    /// wallets and code paths that do not support
    /// [`sign_and_send_transaction`](Self::sign_and_send_transaction).
    #[instrument(skip_all)]
    pub async fn send_transaction(
        &self,
        mut transaction: SupportedTransaction,
    ) -> Result<String, WalletError> {
        let public_key = self.connected_public_key()?;

        let latest = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(WalletError::Network)?;

        if !transaction.is_versioned() {
            transaction.ensure_fee_payer(&public_key);
            transaction.set_recent_blockhash(latest.blockhash);
        }

        let signed = self.sign_transaction(transaction).await?;
        let wire = signed.serialize()?;

        let signature = self
            .rpc
            .send_raw_transaction(&wire)
            .await
            .map_err(WalletError::Network)?;

        self.rpc
            .confirm_transaction(&signature, latest.last_valid_block_height)
            .await
            .map_err(WalletError::Network)?;

        debug!(%signature, "transaction confirmed");
        Ok(signature.to_string())
    }

    /// SOL balance of the authorized account.
    pub async fn balance(&self) -> Result<WalletBalance, WalletError> {
        let public_key = self.connected_public_key()?;

        let lamports = self
            .rpc
            .get_balance(&public_key)
            .await
            .map_err(WalletError::Network)?;

        Ok(WalletBalance {
            address: public_key.to_string(),
            balance_sol: lamports as f64 / 1_000_000_000.0,
            balance_lamports: lamports,
        })
    }

    fn connected_public_key(&self) -> Result<Pubkey, WalletError> {
        let session = self.session.read();
        match (session.public_key, &session.auth_token) {
            (Some(pk), Some(_)) => Ok(pk),
            _ => Err(WalletError::NotConnected),
        }
    }
}

/// Close a channel, logging (not propagating) failures.
async fn close_channel<W: WalletChannel>(channel: &mut W) {
    if let Err(e) = channel.close().await {
        warn!("failed to close wallet channel: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockWalletConnector, MockWalletState};
    use async_trait::async_trait;
    use lib_solana::LatestBlockhash;
    use parking_lot::Mutex;
    use solana_sdk::hash::Hash;
    use solana_sdk::transaction::Transaction;
    use std::sync::atomic::AtomicUsize;

    struct MockRpc {
        blockhash: Hash,
        last_valid_block_height: u64,
        balance_lamports: u64,
        blockhash_calls: AtomicUsize,
        balance_calls: AtomicUsize,
        send_calls: Mutex<Vec<Vec<u8>>>,
        confirm_calls: Mutex<Vec<(Signature, u64)>>,
    }

    impl Default for MockRpc {
        fn default() -> Self {
            Self {
                blockhash: Hash::new_unique(),
                last_valid_block_height: 4242,
                balance_lamports: 2_500_000_000,
                blockhash_calls: AtomicUsize::new(0),
                balance_calls: AtomicUsize::new(0),
                send_calls: Mutex::new(Vec::new()),
                confirm_calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl MockRpc {
        fn total_calls(&self) -> usize {
            self.blockhash_calls.load(Ordering::SeqCst)
                + self.balance_calls.load(Ordering::SeqCst)
                + self.send_calls.lock().len()
                + self.confirm_calls.lock().len()
        }
    }

    #[async_trait]
    impl RpcService for MockRpc {
        async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, String> {
            self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
            Ok(LatestBlockhash {
                blockhash: self.blockhash,
                last_valid_block_height: self.last_valid_block_height,
            })
        }

        async fn get_balance(&self, _pubkey: &Pubkey) -> Result<u64, String> {
            self.balance_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.balance_lamports)
        }

        async fn send_raw_transaction(&self, wire_transaction: &[u8]) -> Result<Signature, String> {
            self.send_calls.lock().push(wire_transaction.to_vec());
            Ok(Signature::default())
        }

        async fn confirm_transaction(
            &self,
            signature: &Signature,
            last_valid_block_height: u64,
        ) -> Result<(), String> {
            self.confirm_calls
                .lock()
                .push((*signature, last_valid_block_height));
            Ok(())
        }
    }

    fn test_context() -> (
        WalletContext<MockWalletConnector>,
        Arc<MockWalletState>,
        Arc<MockRpc>,
    ) {
        let connector = MockWalletConnector::new();
        let state = connector.state();
        let rpc = Arc::new(MockRpc::default());
        let ctx = WalletContext::new(&Config::default(), connector, rpc.clone());
        (ctx, state, rpc)
    }

    fn legacy_tx() -> SupportedTransaction {
        SupportedTransaction::Legacy(Transaction::default())
    }

    #[tokio::test]
    async fn test_connect_populates_session() {
        // Arrange
        let (ctx, state, _rpc) = test_context();
        *state.auth_token.lock() = "T1".to_string();

        // Act
        ctx.connect().await.unwrap();

        // Assert
        let session = ctx.wallet();
        assert!(session.is_connected());
        assert_eq!(session.auth_token.as_deref(), Some("T1"));
        assert!(session.wallet_label.is_some());
        assert!(!ctx.is_connecting());
        assert_eq!(state.authorize_calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.close_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_leaves_session_disconnected() {
        let (ctx, state, _rpc) = test_context();
        state.fail_authorize.store(true, Ordering::SeqCst);

        let result = ctx.connect().await;

        assert!(matches!(result, Err(WalletError::AuthorizationFailed(_))));
        assert!(!ctx.wallet().is_connected());
        assert!(!ctx.is_connecting());

        // the failed attempt does not block a later one
        state.fail_authorize.store(false, Ordering::SeqCst);
        assert!(ctx.connect().await.is_ok());
        assert!(ctx.wallet().is_connected());
    }

    #[tokio::test]
    async fn test_open_failure_is_authorization_failure() {
        let (ctx, state, _rpc) = test_context();
        state.fail_open.store(true, Ordering::SeqCst);

        let result = ctx.connect().await;

        assert!(matches!(result, Err(WalletError::AuthorizationFailed(_))));
        assert_eq!(state.authorize_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reentrant_connect_issues_single_authorize() {
        // Arrange: authorize stalls long enough for the second call to observe
        // the in-flight flag.
        let (ctx, state, _rpc) = test_context();
        *state.auth_token.lock() = "T1".to_string();
        state.authorize_delay_ms.store(50, Ordering::SeqCst);

        // Act
        let (first, second) = tokio::join!(ctx.connect(), ctx.connect());

        // Assert: one exchange, both calls resolved, token from the first
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(state.authorize_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.wallet().auth_token.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (ctx, state, _rpc) = test_context();

        ctx.disconnect().await;
        ctx.disconnect().await;

        assert_eq!(ctx.wallet(), WalletSession::default());
        // no token, so no channel is ever opened
        assert_eq!(state.open_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disconnect_notifies_wallet_and_clears_state() {
        let (ctx, state, _rpc) = test_context();
        ctx.connect().await.unwrap();

        ctx.disconnect().await;

        assert_eq!(state.deauthorize_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.wallet(), WalletSession::default());
    }

    #[tokio::test]
    async fn test_disconnect_clears_state_when_deauthorize_fails() {
        let (ctx, state, _rpc) = test_context();
        ctx.connect().await.unwrap();
        state.fail_deauthorize.store(true, Ordering::SeqCst);

        ctx.disconnect().await;

        assert_eq!(state.deauthorize_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.wallet(), WalletSession::default());
    }

    #[tokio::test]
    async fn test_with_reauthorization_orders_reauth_before_operation() {
        let (ctx, state, _rpc) = test_context();
        ctx.connect().await.unwrap();

        let op_runs = Arc::new(AtomicUsize::new(0));
        let counter = op_runs.clone();
        let probe = state.clone();

        let value = ctx
            .with_reauthorization(move |_wallet| {
                Box::pin(async move {
                    // the refresh exchange has already completed at this point
                    assert_eq!(probe.reauthorize_calls.load(Ordering::SeqCst), 1);
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
            })
            .await
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(op_runs.load(Ordering::SeqCst), 1);
        // one close from connect, one from the wrapped call
        assert_eq!(state.close_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reauthorize_failure_skips_operation_and_keeps_token() {
        let (ctx, state, _rpc) = test_context();
        *state.auth_token.lock() = "T1".to_string();
        ctx.connect().await.unwrap();
        state.fail_reauthorize.store(true, Ordering::SeqCst);

        let result = ctx.sign_message(b"hello".to_vec()).await;

        assert!(matches!(result, Err(WalletError::ReauthorizationFailed(_))));
        // the wrapped operation never ran
        assert_eq!(state.sign_message_calls.load(Ordering::SeqCst), 0);
        // the session is left as-is; recovery is the caller's decision
        assert_eq!(ctx.wallet().auth_token.as_deref(), Some("T1"));
        // the channel was still closed
        assert_eq!(state.close_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_privileged_operation_without_session_never_opens_channel() {
        let (ctx, state, _rpc) = test_context();

        let result = ctx.sign_transaction(legacy_tx()).await;

        assert!(matches!(result, Err(WalletError::NotConnected)));
        assert_eq!(state.open_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_transaction_without_session_makes_no_rpc_calls() {
        let (ctx, state, rpc) = test_context();

        let result = ctx.send_transaction(legacy_tx()).await;

        assert!(matches!(result, Err(WalletError::NotConnected)));
        assert_eq!(rpc.total_calls(), 0);
        assert_eq!(state.open_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sign_transaction_preserves_shape() {
        let (ctx, state, _rpc) = test_context();
        ctx.connect().await.unwrap();

        let signed = ctx.sign_transaction(legacy_tx()).await.unwrap();

        assert!(!signed.is_versioned());
        assert_eq!(state.sign_transaction_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sign_all_transactions_single_exchange_same_order() {
        let (ctx, state, _rpc) = test_context();
        ctx.connect().await.unwrap();

        let hashes: Vec<Hash> = (0..3).map(|_| Hash::new_unique()).collect();
        let txs: Vec<SupportedTransaction> = hashes
            .iter()
            .map(|h| {
                let mut tx = legacy_tx();
                tx.set_recent_blockhash(*h);
                tx
            })
            .collect();

        let signed = ctx.sign_all_transactions(txs).await.unwrap();

        let returned: Vec<Hash> = signed.iter().map(|t| t.recent_blockhash()).collect();
        assert_eq!(returned, hashes);
        assert_eq!(state.sign_transaction_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sign_all_transactions_does_not_reorder_wallet_output() {
        let (ctx, state, _rpc) = test_context();
        ctx.connect().await.unwrap();

        let hashes: Vec<Hash> = (0..3).map(|_| Hash::new_unique()).collect();
        let txs: Vec<SupportedTransaction> = hashes
            .iter()
            .map(|h| {
                let mut tx = legacy_tx();
                tx.set_recent_blockhash(*h);
                tx
            })
            .collect();

        // A wallet that scrambles its output is passed through positionally.
        state.reverse_signed_order.store(true, Ordering::SeqCst);
        let signed = ctx.sign_all_transactions(txs).await.unwrap();

        let returned: Vec<Hash> = signed.iter().map(|t| t.recent_blockhash()).collect();
        let mut expected = hashes.clone();
        expected.reverse();
        assert_eq!(returned, expected);
    }

    #[tokio::test]
    async fn test_sign_all_transactions_count_mismatch_fails() {
        let (ctx, state, _rpc) = test_context();
        ctx.connect().await.unwrap();
        state.truncate_signed.store(true, Ordering::SeqCst);

        let result = ctx
            .sign_all_transactions(vec![legacy_tx(), legacy_tx(), legacy_tx()])
            .await;

        assert!(matches!(
            result,
            Err(WalletError::TransportOperationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_sign_message_targets_authorized_account() {
        let (ctx, state, _rpc) = test_context();
        ctx.connect().await.unwrap();
        let address = ctx.wallet().address().unwrap();

        let signature = ctx.sign_message(b"hello".to_vec()).await.unwrap();

        assert_eq!(signature.len(), 64);
        assert_eq!(*state.last_addresses.lock(), vec![address]);
        assert_eq!(*state.last_messages.lock(), vec![b"hello".to_vec()]);
    }

    #[tokio::test]
    async fn test_sign_and_send_stamps_fetched_blockhash_and_confirms_with_it() {
        let (ctx, state, rpc) = test_context();
        ctx.connect().await.unwrap();

        // recent blockhash deliberately unset on the input
        let signature = ctx.sign_and_send_transaction(legacy_tx()).await.unwrap();

        // blockhash was fetched and stamped before the combined exchange
        assert_eq!(rpc.blockhash_calls.load(Ordering::SeqCst), 1);
        {
            let sent = state.last_signed.lock();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].recent_blockhash(), rpc.blockhash);
        }
        assert_eq!(state.sign_and_send_calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.reauthorize_calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.sign_transaction_calls.load(Ordering::SeqCst), 0);

        // the same validity window drives the confirmation
        let confirms = rpc.confirm_calls.lock();
        assert_eq!(confirms.len(), 1);
        assert_eq!(confirms[0].1, rpc.last_valid_block_height);
        assert_eq!(confirms[0].0.to_string(), signature);
    }

    #[tokio::test]
    async fn test_sign_and_send_stamps_fee_payer_on_legacy() {
        let (ctx, state, _rpc) = test_context();
        ctx.connect().await.unwrap();
        let public_key = ctx.wallet().public_key.unwrap();

        ctx.sign_and_send_transaction(legacy_tx()).await.unwrap();

        let sent = state.last_signed.lock();
        match &sent[0] {
            SupportedTransaction::Legacy(tx) => {
                assert_eq!(tx.message.account_keys.first(), Some(&public_key));
            }
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_send_transaction_signs_then_submits_raw_bytes() {
        let (ctx, state, rpc) = test_context();
        ctx.connect().await.unwrap();

        let signature = ctx.send_transaction(legacy_tx()).await.unwrap();

        // two-step path: sign exchange plus raw submission, no combined call
        assert_eq!(state.sign_transaction_calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.sign_and_send_calls.load(Ordering::SeqCst), 0);
        assert_eq!(rpc.send_calls.lock().len(), 1);

        let confirms = rpc.confirm_calls.lock();
        assert_eq!(confirms.len(), 1);
        assert_eq!(confirms[0].1, rpc.last_valid_block_height);
        assert_eq!(confirms[0].0.to_string(), signature);
    }

    #[tokio::test]
    async fn test_balance_reports_lamports_and_sol() {
        let (ctx, _state, rpc) = test_context();
        ctx.connect().await.unwrap();

        let balance = ctx.balance().await.unwrap();

        assert_eq!(balance.balance_lamports, rpc.balance_lamports);
        assert!((balance.balance_sol - 2.5).abs() < f64::EPSILON);
        assert_eq!(balance.address, ctx.wallet().address().unwrap());
    }

    #[tokio::test]
    async fn test_balance_requires_connection() {
        let (ctx, _state, rpc) = test_context();

        let result = ctx.balance().await;

        assert!(matches!(result, Err(WalletError::NotConnected)));
        assert_eq!(rpc.total_calls(), 0);
    }
}
