//! # Service Traits
//!
//! Trait for the network RPC operations the wallet context depends on,
//! enabling dependency injection and mocking in tests.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use lib_solana::{LatestBlockhash, SolanaConnection};

/// Trait for the RPC operations used by the wallet session.
///
/// This trait allows for dependency injection and mocking in tests.
#[async_trait]
pub trait RpcService: Send + Sync {
    /// Get the latest blockhash and its validity window
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, String>;

    /// Get an account balance in lamports
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, String>;

    /// Submit a signed transaction from its wire bytes
    async fn send_raw_transaction(&self, wire_transaction: &[u8]) -> Result<Signature, String>;

    /// Confirm a signature against its blockhash validity window
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        last_valid_block_height: u64,
    ) -> Result<(), String>;
}

// Implement the trait for the concrete RPC connection
#[async_trait]
impl RpcService for SolanaConnection {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, String> {
        SolanaConnection::get_latest_blockhash(self)
            .await
            .map_err(|e| e.to_string())
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, String> {
        SolanaConnection::get_balance(self, pubkey)
            .await
            .map_err(|e| e.to_string())
    }

    async fn send_raw_transaction(&self, wire_transaction: &[u8]) -> Result<Signature, String> {
        SolanaConnection::send_raw_transaction(self, wire_transaction)
            .await
            .map_err(|e| e.to_string())
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        last_valid_block_height: u64,
    ) -> Result<(), String> {
        SolanaConnection::confirm_transaction(self, signature, last_valid_block_height)
            .await
            .map_err(|e| e.to_string())
    }
}
