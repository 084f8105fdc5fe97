//! # Mock Wallet Transport
//!
//! In-process stand-in for a wallet application, used by this crate's tests
//! and available to development builds through the `mock-wallet` feature (the
//! app's dev-only mock wallet switch).
//!
//! Behavior is scripted through [`MockWalletState`]: failure injection flags,
//! per-exchange call counters, and recorded inputs for assertions. "Signing"
//! is identity: the transactions come back as they went in, optionally
//! reordered or truncated to exercise caller handling.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::transaction::SupportedTransaction;
use crate::transport::{
    AppIdentity, AuthorizationResult, AuthorizedAccount, TransportError, WalletChannel,
    WalletConnector,
};

/// Shared scripted behavior and counters for the mock transport.
#[derive(Debug)]
pub struct MockWalletState {
    // Exchange counters
    pub open_calls: AtomicUsize,
    pub authorize_calls: AtomicUsize,
    pub reauthorize_calls: AtomicUsize,
    pub deauthorize_calls: AtomicUsize,
    pub sign_transaction_calls: AtomicUsize,
    pub sign_message_calls: AtomicUsize,
    pub sign_and_send_calls: AtomicUsize,
    pub close_calls: AtomicUsize,

    // Failure injection
    pub fail_open: AtomicBool,
    pub fail_authorize: AtomicBool,
    pub fail_reauthorize: AtomicBool,
    pub fail_deauthorize: AtomicBool,
    pub fail_operations: AtomicBool,

    // Output shaping
    pub reverse_signed_order: AtomicBool,
    pub truncate_signed: AtomicBool,
    pub authorize_delay_ms: AtomicU64,

    // Scripted authorization result
    pub auth_token: Mutex<String>,
    pub account_address: Mutex<String>,
    pub wallet_uri_base: Mutex<Option<String>>,
    pub sent_signatures: Mutex<Vec<String>>,

    // Recorded inputs
    pub last_signed: Mutex<Vec<SupportedTransaction>>,
    pub last_messages: Mutex<Vec<Vec<u8>>>,
    pub last_addresses: Mutex<Vec<String>>,
}

impl Default for MockWalletState {
    fn default() -> Self {
        Self {
            open_calls: AtomicUsize::new(0),
            authorize_calls: AtomicUsize::new(0),
            reauthorize_calls: AtomicUsize::new(0),
            deauthorize_calls: AtomicUsize::new(0),
            sign_transaction_calls: AtomicUsize::new(0),
            sign_message_calls: AtomicUsize::new(0),
            sign_and_send_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            fail_open: AtomicBool::new(false),
            fail_authorize: AtomicBool::new(false),
            fail_reauthorize: AtomicBool::new(false),
            fail_deauthorize: AtomicBool::new(false),
            fail_operations: AtomicBool::new(false),
            reverse_signed_order: AtomicBool::new(false),
            truncate_signed: AtomicBool::new(false),
            authorize_delay_ms: AtomicU64::new(0),
            auth_token: Mutex::new("mock-token".to_string()),
            account_address: Mutex::new(Pubkey::new_unique().to_string()),
            wallet_uri_base: Mutex::new(Some("https://mockwallet.example".to_string())),
            sent_signatures: Mutex::new(vec![Signature::default().to_string()]),
            last_signed: Mutex::new(Vec::new()),
            last_messages: Mutex::new(Vec::new()),
            last_addresses: Mutex::new(Vec::new()),
        }
    }
}

/// Connector handing out [`MockWalletChannel`]s over shared scripted state.
#[derive(Debug, Clone, Default)]
pub struct MockWalletConnector {
    state: Arc<MockWalletState>,
}

impl MockWalletConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the shared state for scripting and assertions.
    pub fn state(&self) -> Arc<MockWalletState> {
        self.state.clone()
    }
}

#[async_trait]
impl WalletConnector for MockWalletConnector {
    type Channel = MockWalletChannel;

    async fn open(&self) -> Result<Self::Channel, TransportError> {
        self.state.open_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_open.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable(
                "no wallet endpoint available".to_string(),
            ));
        }
        Ok(MockWalletChannel {
            state: self.state.clone(),
        })
    }
}

/// One scripted channel. All exchanges record into the shared state.
#[derive(Debug)]
pub struct MockWalletChannel {
    state: Arc<MockWalletState>,
}

#[async_trait]
impl WalletChannel for MockWalletChannel {
    async fn authorize(
        &mut self,
        _cluster: &str,
        _identity: &AppIdentity,
    ) -> Result<AuthorizationResult, TransportError> {
        self.state.authorize_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.state.authorize_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.state.fail_authorize.load(Ordering::SeqCst) {
            return Err(TransportError::Declined(
                "authorization declined".to_string(),
            ));
        }

        Ok(AuthorizationResult {
            accounts: vec![AuthorizedAccount {
                address: self.state.account_address.lock().clone(),
                label: Some("Mock Wallet".to_string()),
            }],
            auth_token: self.state.auth_token.lock().clone(),
            wallet_uri_base: self.state.wallet_uri_base.lock().clone(),
        })
    }

    async fn reauthorize(
        &mut self,
        _auth_token: &str,
        _identity: &AppIdentity,
    ) -> Result<Option<String>, TransportError> {
        self.state.reauthorize_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_reauthorize.load(Ordering::SeqCst) {
            return Err(TransportError::Declined("token revoked".to_string()));
        }
        Ok(None)
    }

    async fn deauthorize(&mut self, _auth_token: &str) -> Result<(), TransportError> {
        self.state.deauthorize_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_deauthorize.load(Ordering::SeqCst) {
            return Err(TransportError::Protocol("deauthorize failed".to_string()));
        }
        Ok(())
    }

    async fn sign_transactions(
        &mut self,
        transactions: Vec<SupportedTransaction>,
    ) -> Result<Vec<SupportedTransaction>, TransportError> {
        self.state
            .sign_transaction_calls
            .fetch_add(1, Ordering::SeqCst);
        if self.state.fail_operations.load(Ordering::SeqCst) {
            return Err(TransportError::Protocol("signing failed".to_string()));
        }

        *self.state.last_signed.lock() = transactions.clone();

        let mut signed = transactions;
        if self.state.reverse_signed_order.load(Ordering::SeqCst) {
            signed.reverse();
        }
        if self.state.truncate_signed.load(Ordering::SeqCst) {
            signed.pop();
        }
        Ok(signed)
    }

    async fn sign_messages(
        &mut self,
        addresses: &[String],
        payloads: &[Vec<u8>],
    ) -> Result<Vec<Vec<u8>>, TransportError> {
        self.state.sign_message_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_operations.load(Ordering::SeqCst) {
            return Err(TransportError::Protocol(
                "message signing failed".to_string(),
            ));
        }

        *self.state.last_addresses.lock() = addresses.to_vec();
        *self.state.last_messages.lock() = payloads.to_vec();

        Ok(vec![vec![0xAB; 64]; payloads.len()])
    }

    async fn sign_and_send_transactions(
        &mut self,
        transactions: Vec<SupportedTransaction>,
    ) -> Result<Vec<String>, TransportError> {
        self.state.sign_and_send_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_operations.load(Ordering::SeqCst) {
            return Err(TransportError::Protocol("submission failed".to_string()));
        }

        *self.state.last_signed.lock() = transactions;

        Ok(self.state.sent_signatures.lock().clone())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.state.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
