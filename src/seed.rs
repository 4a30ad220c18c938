//! Seed mapping loaded once at startup.
//!
//! Without configuration the ledger starts from a fixed demo table. The
//! `PRELOAD_ACCOUNTS` environment variable replaces it with a JSON object
//! such as `{"1001":"1000.00","1002":250.5}`.

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::{
    ledger::AccountNumber,
    money::{MinorUnits, MoneyError, parse_to_minor_units},
};

pub const PRELOAD_ACCOUNTS_ENV: &str = "PRELOAD_ACCOUNTS";

pub type SeedMapping = Vec<(AccountNumber, MinorUnits)>;

/// Startup failure. Always fatal, the process must not run on partial data.
#[derive(Debug, Error)]
#[error("Failed to parse PRELOAD_ACCOUNTS: {0}")]
pub struct SeedError(#[source] SeedProblem);

#[derive(Debug, Error)]
pub enum SeedProblem {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object of account number to balance")]
    NotAnObject,
    #[error("balance must be string or number")]
    BalanceType,
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error("balance of account {account} must not be negative")]
    NegativeBalance { account: AccountNumber },
}

pub fn default_accounts() -> SeedMapping {
    vec![
        ("1001".to_owned(), 100000),
        ("1002".to_owned(), 25050),
        ("1003".to_owned(), 0),
        ("1004".to_owned(), 50000),
    ]
}

/// Reads the seed mapping from the process environment.
pub fn from_env() -> Result<SeedMapping, SeedError> {
    load(std::env::var(PRELOAD_ACCOUNTS_ENV).ok().as_deref())
}

/// Builds the seed mapping from the raw value of `PRELOAD_ACCOUNTS`.
/// An unset or empty value selects [`default_accounts`].
pub fn load(preload: Option<&str>) -> Result<SeedMapping, SeedError> {
    match preload {
        None | Some("") => {
            info!("using default account table");
            Ok(default_accounts())
        }
        Some(raw) => {
            let accounts = parse(raw).map_err(SeedError)?;
            info!(count = accounts.len(), "preloaded accounts");
            Ok(accounts)
        }
    }
}

fn parse(raw: &str) -> Result<SeedMapping, SeedProblem> {
    let Value::Object(entries) = serde_json::from_str::<Value>(raw)? else {
        return Err(SeedProblem::NotAnObject);
    };
    entries
        .into_iter()
        .map(|(account, value)| {
            let balance = match &value {
                Value::String(text) => parse_to_minor_units(text)?,
                // rendered text of the JSON number, never f64 arithmetic
                Value::Number(number) => parse_to_minor_units(&number.to_string())?,
                _ => return Err(SeedProblem::BalanceType),
            };
            if balance < 0 {
                return Err(SeedProblem::NegativeBalance { account });
            }
            Ok((account, balance))
        })
        .collect()
}
