use std::{
    collections::{BTreeMap, HashMap, hash_map::Entry},
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
};

use tracing::{debug, info, warn};

use crate::money::{MinorUnits, format_from_minor_units};

use super::{AccountNumber, BalanceLedger, LedgerError};

/// Balance slot of a single account. The mutex doubles as the account lock,
/// so an account can never exist without its lock.
type AccountSlot = Arc<Mutex<MinorUnits>>;

/// In-memory ledger with one lock per account.
///
/// The registry lock only guards the set of accounts. Balance arithmetic
/// happens under the account's own mutex after the registry guard has been
/// released, so unrelated accounts never contend with each other.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: RwLock<HashMap<AccountNumber, AccountSlot>>,
}

impl InMemoryLedger {
    /// Builds the ledger from the seed mapping.
    pub fn new(
        seed: impl IntoIterator<Item = (AccountNumber, MinorUnits)>,
    ) -> Result<Self, LedgerError> {
        let mut accounts = HashMap::new();
        for (account, balance) in seed {
            if balance < 0 {
                return Err(LedgerError::NegativeBalance { balance });
            }
            accounts.insert(account, Arc::new(Mutex::new(balance)));
        }
        Ok(Self {
            accounts: RwLock::new(accounts),
        })
    }

    fn slot(&self, account: &str) -> Result<AccountSlot, LedgerError> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account)
            .cloned()
            .ok_or(LedgerError::AccountNotFound)
    }
}

// Critical sections only ever store a fully computed value, so a poisoned
// guard still protects a valid balance.
fn lock(slot: &Mutex<MinorUnits>) -> MutexGuard<'_, MinorUnits> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn ensure_positive(amount: MinorUnits) -> Result<(), LedgerError> {
    if amount > 0 {
        Ok(())
    } else {
        Err(LedgerError::NonPositiveAmount { amount })
    }
}

impl BalanceLedger for InMemoryLedger {
    fn has_account(&self, account: &str) -> bool {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(account)
    }

    fn get_balance(&self, account: &str) -> Result<MinorUnits, LedgerError> {
        let slot = self.slot(account)?;
        let balance = *lock(&slot);
        Ok(balance)
    }

    fn deposit(&self, account: &str, amount: MinorUnits) -> Result<MinorUnits, LedgerError> {
        ensure_positive(amount)?;
        let slot = self.slot(account)?;
        let mut balance = lock(&slot);
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        debug!(account, amount, balance = *balance, "deposit applied");
        Ok(*balance)
    }

    fn withdraw(&self, account: &str, amount: MinorUnits) -> Result<MinorUnits, LedgerError> {
        ensure_positive(amount)?;
        let slot = self.slot(account)?;
        let mut balance = lock(&slot);
        if amount > *balance {
            warn!(account, amount, balance = *balance, "withdrawal rejected");
            return Err(LedgerError::InsufficientFunds);
        }
        *balance -= amount;
        debug!(account, amount, balance = *balance, "withdrawal applied");
        Ok(*balance)
    }

    fn create_account(
        &self,
        account: &str,
        opening_balance: MinorUnits,
    ) -> Result<(), LedgerError> {
        if opening_balance < 0 {
            return Err(LedgerError::NegativeBalance {
                balance: opening_balance,
            });
        }
        let mut accounts = self
            .accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match accounts.entry(account.to_owned()) {
            Entry::Occupied(_) => Err(LedgerError::AccountAlreadyExists),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(opening_balance)));
                info!(account, opening_balance, "account created");
                Ok(())
            }
        }
    }

    fn snapshot(&self) -> BTreeMap<AccountNumber, String> {
        let slots: Vec<(AccountNumber, AccountSlot)> = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(account, slot)| (account.clone(), Arc::clone(slot)))
            .collect();
        slots
            .into_iter()
            .map(|(account, slot)| {
                let balance = *lock(&slot);
                (account, format_from_minor_units(balance))
            })
            .collect()
    }
}
