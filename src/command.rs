use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    ledger::AccountNumber,
    money::{MinorUnits, MoneyError, parse_decimal, to_minor_units},
};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Balance,
    Deposit,
    Withdraw,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAction {
    Deposit,
    Withdraw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionCommand {
    pub account: AccountNumber,
    pub action: TransactionAction,
    pub amount: MinorUnits,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Balance { account: AccountNumber },
    Transaction(TransactionCommand),
    Open {
        account: AccountNumber,
        opening_balance: MinorUnits,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("amount is required for {kind:?}")]
    AmountRequired { kind: RequestKind },
    #[error("amount must be a decimal number (e.g., '12.34')")]
    NotDecimal,
    #[error("amount must be positive")]
    NotPositive,
    #[error("amount must not be negative")]
    Negative,
    #[error("amount must have at most 2 decimal places")]
    TooManyDecimals,
    #[error("amount is out of range")]
    OutOfRange,
}

/// Validates a transaction amount: a decimal number, strictly positive,
/// with at most two fractional digits.
pub fn parse_amount(text: &str) -> Result<MinorUnits, CommandError> {
    let amount = parse_strict(text)?;
    if amount <= Decimal::ZERO {
        return Err(CommandError::NotPositive);
    }
    to_minor_units(amount).map_err(|_| CommandError::OutOfRange)
}

/// Same as [`parse_amount`], but zero is allowed.
pub fn parse_opening_balance(text: &str) -> Result<MinorUnits, CommandError> {
    let amount = parse_strict(text)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CommandError::Negative);
    }
    to_minor_units(amount).map_err(|_| CommandError::OutOfRange)
}

fn parse_strict(text: &str) -> Result<Decimal, CommandError> {
    let amount = parse_decimal(text).map_err(|err| match err {
        MoneyError::InvalidFormat(_) => CommandError::NotDecimal,
        MoneyError::OutOfRange(_) => CommandError::OutOfRange,
    })?;
    if amount.scale() > 2 {
        return Err(CommandError::TooManyDecimals);
    }
    Ok(amount)
}

impl Command {
    pub fn parse(
        kind: RequestKind,
        account: AccountNumber,
        amount: Option<&str>,
    ) -> Result<Self, CommandError> {
        match kind {
            RequestKind::Balance => Ok(Self::Balance { account }),
            RequestKind::Deposit => Ok(Self::Transaction(TransactionCommand {
                account,
                action: TransactionAction::Deposit,
                amount: parse_amount(require_amount(kind, amount)?)?,
            })),
            RequestKind::Withdraw => Ok(Self::Transaction(TransactionCommand {
                account,
                action: TransactionAction::Withdraw,
                amount: parse_amount(require_amount(kind, amount)?)?,
            })),
            RequestKind::Open => Ok(Self::Open {
                account,
                opening_balance: parse_opening_balance(require_amount(kind, amount)?)?,
            }),
        }
    }
}

fn require_amount(kind: RequestKind, amount: Option<&str>) -> Result<&str, CommandError> {
    amount
        .filter(|text| !text.is_empty())
        .ok_or(CommandError::AmountRequired { kind })
}
