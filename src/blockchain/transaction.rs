use std::fmt;

/// Sentinel sender that mints coins out of nothing.
///
/// The ledger never assigns this account a balance entry, so its debits
/// (and credits) are dropped rather than tracked.
pub const MINT_ACCOUNT: &str = "bitcoin";

/// Represents a single transfer between two accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Sender's account name
    pub sender: String,

    /// Receiver's account name
    pub receiver: String,

    /// Amount being transferred
    ///
    /// A valid chain only contains positive amounts; this is enforced by
    /// the chain validator, not here.
    pub amount: i64,
}

impl Transaction {
    /// Creates a new transaction
    ///
    /// # Arguments
    ///
    /// * `sender` - The account sending the amount
    /// * `receiver` - The account receiving the amount
    /// * `amount` - The amount to transfer
    ///
    /// # Returns
    ///
    /// A new Transaction instance
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: i64) -> Self {
        Transaction {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }

    /// Checks whether this transaction mints coins from the sentinel account
    pub fn is_mint(&self) -> bool {
        self.sender == MINT_ACCOUNT
    }
}

impl fmt::Display for Transaction {
    /// The canonical form hashed into the block: `sender:receiver=amount`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}={}", self.sender, self.receiver, self.amount)
    }
}
