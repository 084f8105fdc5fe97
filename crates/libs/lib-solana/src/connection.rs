//! # Solana RPC Connection
//!
//! Provides a high-level wrapper around the Solana RPC client with cluster
//! management and confirmation polling.
//!
//! ## Features
//!
//! - **Cluster Selection**: Mainnet-beta, devnet, or testnet with public
//!   endpoint defaults and a custom RPC URL override
//! - **Blockhash Queries**: Latest blockhash together with its validity window
//! - **Balance Queries**: SOL and SPL token balances by public key
//! - **Transaction Submission**: Submit signed wire bytes on-chain
//! - **Confirmation Polling**: Confirm a signature against a blockhash's
//!   validity window
//! - **Health Checks**: Verify RPC endpoint connectivity
//!
//! ## Example
//!
//! ```rust,no_run
//! use lib_core::Cluster;
//! use lib_solana::SolanaConnection;
//!
//! # async fn example() -> lib_core::Result<()> {
//! let connection = SolanaConnection::builder()
//!     .cluster(Cluster::Devnet)
//!     .build();
//!
//! let blockhash = connection.get_latest_blockhash().await?;
//! println!("blockhash {} valid through {}", blockhash.blockhash, blockhash.last_valid_block_height);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use spl_associated_token_account::get_associated_token_address;
use tracing::{debug, info};

use lib_core::{AppError, Cluster, Config, Result};

/// Interval between signature status polls during confirmation.
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(400);

/// Latest blockhash together with the last block height it is valid for.
///
/// Transactions referencing this blockhash must confirm before the chain
/// passes `last_valid_block_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// High-level Solana RPC connection wrapper.
///
/// Wraps the nonblocking `solana_client::RpcClient` with cluster configuration
/// and confirmation polling. The inner client is `Arc`-shared, so cloning the
/// connection is cheap and clones reuse the same HTTP connection pool.
#[derive(Clone)]
pub struct SolanaConnection {
    rpc: Arc<RpcClient>,
    cluster: Cluster,
}

/// Builder for configuring [`SolanaConnection`].
#[derive(Debug, Clone, Default)]
pub struct SolanaConnectionBuilder {
    cluster: Option<Cluster>,
    custom_rpc_url: Option<String>,
}

impl SolanaConnectionBuilder {
    /// Set the Solana cluster.
    pub fn cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = Some(cluster);
        self
    }

    /// Set a custom RPC URL (overrides the cluster's public endpoint).
    pub fn custom_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.custom_rpc_url = Some(url.into());
        self
    }

    /// Build the connection with the configured settings.
    pub fn build(self) -> SolanaConnection {
        let cluster = self.cluster.unwrap_or(Cluster::MainnetBeta);
        let rpc_url = self
            .custom_rpc_url
            .unwrap_or_else(|| cluster.default_rpc_url().to_string());

        info!("🔗 Connecting to Solana RPC: {}", rpc_url);

        SolanaConnection {
            rpc: Arc::new(RpcClient::new_with_commitment(
                rpc_url,
                CommitmentConfig::confirmed(),
            )),
            cluster,
        }
    }
}

impl SolanaConnection {
    /// Create a new connection using a builder for configuration.
    pub fn builder() -> SolanaConnectionBuilder {
        SolanaConnectionBuilder::default()
    }

    /// Create a connection from the application configuration, honoring the
    /// `RPC_ENDPOINT` override when present.
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::builder().cluster(config.cluster);
        if let Some(endpoint) = &config.rpc_endpoint {
            builder = builder.custom_rpc_url(endpoint.clone());
        }
        builder.build()
    }

    /// Get the latest blockhash and its validity window.
    ///
    /// Blockhashes expire after roughly a minute, so fetch close to when the
    /// transaction will be submitted.
    pub async fn get_latest_blockhash(&self) -> Result<LatestBlockhash> {
        let (blockhash, last_valid_block_height) = self
            .rpc
            .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
            .await
            .map_err(|e| AppError::Rpc(format!("Failed to get latest blockhash: {}", e)))?;

        Ok(LatestBlockhash {
            blockhash,
            last_valid_block_height,
        })
    }

    /// Get an account's balance in lamports.
    pub async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64> {
        self.rpc
            .get_balance(pubkey)
            .await
            .map_err(|e| AppError::Rpc(format!("Failed to get balance: {}", e)))
    }

    /// Get an account's balance in SOL.
    pub async fn get_balance_sol(&self, pubkey: &Pubkey) -> Result<f64> {
        let lamports = self.get_balance(pubkey).await?;
        Ok(lamports as f64 / 1_000_000_000.0)
    }

    /// Get an SPL token balance for a wallet via its associated token account.
    ///
    /// # Returns
    /// The human-readable token amount, or an error if the associated account
    /// does not exist or the RPC request fails.
    pub async fn get_token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<f64> {
        let token_account = get_associated_token_address(owner, mint);

        let balance = self
            .rpc
            .get_token_account_balance(&token_account)
            .await
            .map_err(|e| AppError::Rpc(format!("Failed to get token balance: {}", e)))?;

        balance
            .ui_amount
            .ok_or_else(|| AppError::Rpc("No UI amount in token balance response".to_string()))
    }

    /// Submit a signed transaction from its wire bytes.
    ///
    /// Accepts both the legacy and the versioned wire encoding; the bytes are
    /// decoded and handed to the RPC node without waiting for confirmation.
    /// Use [`confirm_transaction`](Self::confirm_transaction) to wait.
    pub async fn send_raw_transaction(&self, wire_transaction: &[u8]) -> Result<Signature> {
        let transaction: VersionedTransaction = bincode::deserialize(wire_transaction)
            .map_err(|e| AppError::Decoding(format!("Invalid wire transaction: {}", e)))?;

        let signature = self
            .rpc
            .send_transaction(&transaction)
            .await
            .map_err(|e| AppError::Rpc(format!("Failed to send transaction: {}", e)))?;

        debug!("submitted transaction {}", signature);
        Ok(signature)
    }

    /// Confirm a transaction signature against its blockhash validity window.
    ///
    /// Polls signature status at confirmed commitment. Fails if the network
    /// reports a transaction error, or if the chain height passes
    /// `last_valid_block_height` without the signature confirming (the
    /// blockhash has expired and the transaction can no longer land).
    pub async fn confirm_transaction(
        &self,
        signature: &Signature,
        last_valid_block_height: u64,
    ) -> Result<()> {
        loop {
            let statuses = self
                .rpc
                .get_signature_statuses(&[*signature])
                .await
                .map_err(|e| AppError::Rpc(format!("Failed to get signature status: {}", e)))?;

            if let Some(status) = statuses.value.first().and_then(|s| s.as_ref()) {
                if let Some(err) = &status.err {
                    return Err(AppError::Transaction(format!(
                        "Transaction {} failed: {:?}",
                        signature, err
                    )));
                }
                if status.satisfies_commitment(CommitmentConfig::confirmed()) {
                    debug!("transaction {} confirmed", signature);
                    return Ok(());
                }
            }

            let block_height = self
                .rpc
                .get_block_height()
                .await
                .map_err(|e| AppError::Rpc(format!("Failed to get block height: {}", e)))?;

            if block_height > last_valid_block_height {
                return Err(AppError::Transaction(format!(
                    "Transaction {} expired: blockhash valid through block {}, chain is at {}",
                    signature, last_valid_block_height, block_height
                )));
            }

            tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
        }
    }

    /// Check if the RPC endpoint is healthy and responsive.
    pub async fn health_check(&self) -> Result<()> {
        let _ = self
            .rpc
            .get_version()
            .await
            .map_err(|e| AppError::Rpc(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// The cluster this connection targets.
    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    /// The RPC endpoint URL in use.
    pub fn url(&self) -> String {
        self.rpc.url()
    }
}
