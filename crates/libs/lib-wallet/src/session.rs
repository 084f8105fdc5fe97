//! # Wallet Session State
//!
//! The in-memory snapshot of the current wallet authorization. Sessions are
//! never persisted; an app restart requires a fresh connect.

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

/// Snapshot of the current authorization state with a wallet application.
///
/// `public_key` and `auth_token` are written together as a unit (whole-struct
/// replacement), so a session is either fully populated or fully empty;
/// there is no state where one is present without the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalletSession {
    /// Account address currently authorized; `None` when disconnected
    pub public_key: Option<Pubkey>,
    /// Opaque wallet credential presented on reauthorization; `None` when disconnected
    pub auth_token: Option<String>,
    /// Human-readable wallet identity, best effort
    pub wallet_label: Option<String>,
}

impl WalletSession {
    /// Whether the session holds a usable authorization.
    pub fn is_connected(&self) -> bool {
        self.public_key.is_some() && self.auth_token.is_some()
    }

    /// The authorized account address as a base58 string.
    pub fn address(&self) -> Option<String> {
        self.public_key.map(|pk| pk.to_string())
    }
}
