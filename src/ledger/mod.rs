use std::collections::BTreeMap;

use thiserror::Error;

use crate::money::MinorUnits;

pub mod in_memory;

pub type AccountNumber = String;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("account not found")]
    AccountNotFound,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("account already exists")]
    AccountAlreadyExists,
    #[error("amount must be positive, got {amount} minor units")]
    NonPositiveAmount { amount: MinorUnits },
    #[error("balance must not be negative, got {balance} minor units")]
    NegativeBalance { balance: MinorUnits },
    #[error("balance would overflow")]
    BalanceOverflow,
}

/// Authoritative store of account balances.
///
/// Every operation is atomic per account: it either applies completely or
/// fails leaving the balance untouched. Implementations must be safe to share
/// between threads.
pub trait BalanceLedger: Send + Sync {
    fn has_account(&self, account: &str) -> bool;

    fn get_balance(&self, account: &str) -> Result<MinorUnits, LedgerError>;

    /// Adds `amount` (> 0) and returns the new balance.
    fn deposit(&self, account: &str, amount: MinorUnits) -> Result<MinorUnits, LedgerError>;

    /// Subtracts `amount` (> 0) and returns the new balance.
    /// Fails with [`LedgerError::InsufficientFunds`] instead of going negative.
    fn withdraw(&self, account: &str, amount: MinorUnits) -> Result<MinorUnits, LedgerError>;

    fn create_account(
        &self,
        account: &str,
        opening_balance: MinorUnits,
    ) -> Result<(), LedgerError>;

    /// Formatted balance of every account, ordered by account number.
    /// Each value is consistent on its own; the listing as a whole is not
    /// taken atomically.
    fn snapshot(&self) -> BTreeMap<AccountNumber, String>;
}
