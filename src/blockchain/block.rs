use chrono::Utc;

use super::crypto;
use super::nonce;
use super::transaction::Transaction;

/// Previous-hash sentinel carried by the first block of a chain.
pub const GENESIS_HASH: &str = "00000";

/// Number of leading zero hex characters a sealed block's hash must have.
///
/// At 5 hex digits the search succeeds with probability 16^-5 per trial,
/// i.e. about one million digests per block on average.
pub const DIFFICULTY: usize = 5;

/// Represents one sealed entry of the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Index of the block in the chain
    pub index: u64,

    /// Timestamp of block creation, milliseconds since epoch
    pub timestamp: i64,

    /// The transaction recorded by this block
    pub transaction: Transaction,

    /// Nonce found by the mining search
    pub nonce: String,

    /// Hash of the previous block, or [`GENESIS_HASH`] for index 0
    pub previous_hash: String,

    /// Hash of this block's canonical string
    pub hash: String,

    /// Number of nonce candidates examined while sealing this block
    ///
    /// A mining-session statistic only: never persisted, never validated,
    /// and 0 for blocks reconstructed from storage.
    pub tries: u64,
}

impl Block {
    /// Seals a new block by proof of work.
    ///
    /// Blocks until a nonce is found whose hash carries [`DIFFICULTY`]
    /// leading zeros. The timestamp is taken once, before the search, and
    /// held fixed for every trial.
    ///
    /// # Arguments
    ///
    /// * `index` - The index this block will occupy in the chain
    /// * `transaction` - The transaction to record
    /// * `previous_hash` - The hash of the current chain tip
    ///
    /// # Returns
    ///
    /// The sealed block, with `tries` set to the number of candidates examined
    pub fn sealed(index: u64, transaction: Transaction, previous_hash: String) -> Self {
        Self::sealed_at(
            index,
            transaction,
            previous_hash,
            Utc::now().timestamp_millis(),
            DIFFICULTY,
        )
    }

    /// Seals a block with an explicit timestamp and difficulty.
    ///
    /// This is the deterministic core of [`Block::sealed`]: given the same
    /// inputs, two runs examine nonces in the same order and produce an
    /// identical `nonce`, `hash` and `tries`.
    ///
    /// # Arguments
    ///
    /// * `index` - The index this block will occupy in the chain
    /// * `transaction` - The transaction to record
    /// * `previous_hash` - The hash of the current chain tip
    /// * `timestamp` - Creation time, milliseconds since epoch
    /// * `difficulty` - Required number of leading zero hex characters
    ///
    /// # Returns
    ///
    /// The sealed block
    pub fn sealed_at(
        index: u64,
        transaction: Transaction,
        previous_hash: String,
        timestamp: i64,
        difficulty: usize,
    ) -> Self {
        let target = "0".repeat(difficulty);
        let prefix = format!("{}:{}.", timestamp, transaction);
        let mut payload = String::with_capacity(prefix.len() + previous_hash.len() + 16);

        let mut count: u64 = 0;
        loop {
            let candidate = nonce::encode(count);
            payload.clear();
            payload.push_str(&prefix);
            payload.push_str(&candidate);
            payload.push_str(&previous_hash);

            let hash = crypto::digest(&payload);
            if hash.starts_with(&target) {
                return Block {
                    index,
                    timestamp,
                    transaction,
                    nonce: candidate,
                    previous_hash,
                    hash,
                    tries: count,
                };
            }

            count += 1;
        }
    }

    /// Seals a block within a bounded trial budget.
    ///
    /// Same trial order as [`Block::sealed_at`], but gives up after
    /// `max_tries` candidates instead of searching forever. Callers that
    /// need responsiveness can drive the search in slices.
    ///
    /// # Arguments
    ///
    /// * `index` - The index this block will occupy in the chain
    /// * `transaction` - The transaction to record
    /// * `previous_hash` - The hash of the current chain tip
    /// * `timestamp` - Creation time, milliseconds since epoch
    /// * `difficulty` - Required number of leading zero hex characters
    /// * `max_tries` - Number of candidates to examine before giving up
    ///
    /// # Returns
    ///
    /// The sealed block, or `None` if the budget was exhausted
    pub fn sealed_within(
        index: u64,
        transaction: Transaction,
        previous_hash: String,
        timestamp: i64,
        difficulty: usize,
        max_tries: u64,
    ) -> Option<Self> {
        let target = "0".repeat(difficulty);
        let prefix = format!("{}:{}.", timestamp, transaction);
        let mut payload = String::with_capacity(prefix.len() + previous_hash.len() + 16);

        for count in 0..max_tries {
            let candidate = nonce::encode(count);
            payload.clear();
            payload.push_str(&prefix);
            payload.push_str(&candidate);
            payload.push_str(&previous_hash);

            let hash = crypto::digest(&payload);
            if hash.starts_with(&target) {
                return Some(Block {
                    index,
                    timestamp,
                    transaction,
                    nonce: candidate,
                    previous_hash,
                    hash,
                    tries: count,
                });
            }
        }

        None
    }

    /// Reconstructs a block verbatim from persisted fields.
    ///
    /// No re-mining and no validation happen here; checking the stored
    /// fields against each other is the chain validator's job.
    ///
    /// # Arguments
    ///
    /// * `index` - The stored block index
    /// * `transaction` - The stored transaction
    /// * `nonce` - The stored nonce
    /// * `previous_hash` - The hash of the preceding block
    /// * `hash` - The stored block hash
    /// * `timestamp` - The stored creation time, milliseconds since epoch
    ///
    /// # Returns
    ///
    /// A Block with `tries` defaulted to 0
    pub fn from_stored(
        index: u64,
        transaction: Transaction,
        nonce: String,
        previous_hash: String,
        hash: String,
        timestamp: i64,
    ) -> Self {
        Block {
            index,
            timestamp,
            transaction,
            nonce,
            previous_hash,
            hash,
            tries: 0,
        }
    }

    /// Builds the exact string this block's hash is computed over:
    /// `timestamp:sender:receiver=amount.nonce` followed by the previous hash.
    pub fn canonical_string(&self) -> String {
        format!(
            "{}:{}.{}{}",
            self.timestamp, self.transaction, self.nonce, self.previous_hash
        )
    }
}
