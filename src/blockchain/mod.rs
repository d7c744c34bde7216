// Blockchain module
//
// This module contains the core ledger implementation including:
// - Transaction record
// - Block structure and the proof-of-work mining search
// - Nonce trial-counter encoding
// - Digest function
// - Balance ledger
// - Chain structure and validator
// - Plain-text chain file storage

pub mod block;
pub mod chain;
pub mod crypto;
pub mod ledger;
pub mod nonce;
pub mod storage;
pub mod transaction;

// Re-export main components for easier access
pub use block::Block;
pub use chain::Blockchain;
pub use transaction::{Transaction, MINT_ACCOUNT};
