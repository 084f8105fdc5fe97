//! # Solana Library
//!
//! Solana RPC integration: connection management, blockhash and balance
//! queries, raw transaction submission, and confirmation polling.

pub mod connection;

// Re-export commonly used types
pub use connection::{LatestBlockhash, SolanaConnection, SolanaConnectionBuilder};
