use std::collections::HashMap;

use super::block::Block;
use super::transaction::{Transaction, MINT_ACCOUNT};

/// Balance table derived from the chain's transactions.
///
/// Not a source of truth: the chain is. The ledger is maintained
/// incrementally as blocks are appended and can be rebuilt at any time
/// with [`Ledger::replay`].
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<String, i64>,
}

impl Ledger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Applies one transaction: debit the sender, credit the receiver.
    ///
    /// Writes against the mint sentinel account are dropped, so minting
    /// has no funding source to drive negative.
    ///
    /// # Arguments
    ///
    /// * `transaction` - The transaction to apply
    pub fn apply(&mut self, transaction: &Transaction) {
        self.adjust(&transaction.sender, -transaction.amount);
        self.adjust(&transaction.receiver, transaction.amount);
    }

    /// Adds `delta` to an account's balance, creating the entry if needed.
    ///
    /// The mint sentinel never gets an entry.
    fn adjust(&mut self, account: &str, delta: i64) {
        if account == MINT_ACCOUNT {
            return;
        }
        *self.balances.entry(account.to_string()).or_insert(0) += delta;
    }

    /// Gets an account's balance
    ///
    /// # Arguments
    ///
    /// * `account` - The account name
    ///
    /// # Returns
    ///
    /// The balance, or 0 for an account with no entry
    pub fn balance(&self, account: &str) -> i64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Checks whether an account has a balance entry at all
    pub fn has_entry(&self, account: &str) -> bool {
        self.balances.contains_key(account)
    }

    /// Derives a fresh ledger by replaying blocks in chain order.
    ///
    /// # Arguments
    ///
    /// * `blocks` - The blocks to replay, in chain order
    ///
    /// # Returns
    ///
    /// The ledger resulting from applying every transaction in turn
    pub fn replay<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Self {
        let mut ledger = Ledger::new();
        for block in blocks {
            ledger.apply(&block.transaction);
        }
        ledger
    }

    /// Finds an overdrawn account, if any
    ///
    /// # Returns
    ///
    /// Some account with a negative balance, or `None` if all balances
    /// are non-negative
    pub fn first_negative(&self) -> Option<(&str, i64)> {
        self.balances
            .iter()
            .find(|(_, &balance)| balance < 0)
            .map(|(account, &balance)| (account.as_str(), balance))
    }
}
