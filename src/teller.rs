use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;
use thiserror::Error;

use crate::{
    command::{Command, CommandError, TransactionAction, TransactionCommand},
    ledger::{AccountNumber, BalanceLedger, LedgerError},
    money::format_from_minor_units,
};

pub const SERVICE_NAME: &str = "Mini ATM Server";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceReply {
    pub account_number: AccountNumber,
    pub balance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReply {
    pub status: &'static str,
    pub accounts: Vec<AccountNumber>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub docs: &'static str,
    pub sample_accounts: BTreeMap<AccountNumber, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Balance(BalanceReply),
    Opened { account_number: AccountNumber },
}

/// Caller-visible failure of a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error(transparent)]
    Validation(#[from] CommandError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl RequestError {
    /// Transport status the failure maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::Validation(_) => 422,
            RequestError::Ledger(LedgerError::AccountNotFound) => 404,
            RequestError::Ledger(_) => 400,
        }
    }
}

/// Translates validated requests into ledger calls and ledger results into
/// caller-facing replies. Balances only ever leave as two-decimal strings.
pub struct Teller<L> {
    ledger: Arc<L>,
}

impl<L> Clone for Teller<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<L: BalanceLedger> Teller<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn handle(&self, command: Command) -> Result<Reply, RequestError> {
        match command {
            Command::Balance { account } => self.balance(account).map(Reply::Balance),
            Command::Transaction(command) => self.transact(command).map(Reply::Balance),
            Command::Open {
                account,
                opening_balance,
            } => {
                self.ledger.create_account(&account, opening_balance)?;
                Ok(Reply::Opened {
                    account_number: account,
                })
            }
        }
    }

    pub fn balance(&self, account: AccountNumber) -> Result<BalanceReply, RequestError> {
        let balance = self.ledger.get_balance(&account)?;
        Ok(BalanceReply {
            account_number: account,
            balance: format_from_minor_units(balance),
        })
    }

    pub fn transact(&self, command: TransactionCommand) -> Result<BalanceReply, RequestError> {
        let balance = match command.action {
            TransactionAction::Deposit => self.ledger.deposit(&command.account, command.amount)?,
            TransactionAction::Withdraw => self.ledger.withdraw(&command.account, command.amount)?,
        };
        Ok(BalanceReply {
            account_number: command.account,
            balance: format_from_minor_units(balance),
        })
    }

    pub fn health(&self) -> HealthReply {
        HealthReply {
            status: "ok",
            accounts: self.ledger.snapshot().into_keys().collect(),
        }
    }

    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            message: SERVICE_NAME,
            docs: "/docs",
            sample_accounts: self.ledger.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{command::RequestKind, ledger::in_memory::InMemoryLedger, seed};

    use super::*;

    fn teller() -> Teller<InMemoryLedger> {
        let ledger = InMemoryLedger::new(seed::default_accounts()).unwrap();
        Teller::new(Arc::new(ledger))
    }

    fn request(
        teller: &Teller<InMemoryLedger>,
        kind: RequestKind,
        account: &str,
        amount: Option<&str>,
    ) -> Result<Reply, RequestError> {
        let command = Command::parse(kind, account.to_owned(), amount)?;
        teller.handle(command)
    }

    fn balance_of(reply: Result<Reply, RequestError>) -> String {
        match reply.unwrap() {
            Reply::Balance(reply) => reply.balance,
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn deposit_then_withdraw_scenario() {
        let teller = teller();
        let reply = request(&teller, RequestKind::Deposit, "1002", Some("10.50"));
        assert_eq!(balance_of(reply), "261.00");
        let reply = request(&teller, RequestKind::Withdraw, "1002", Some("1.25"));
        assert_eq!(balance_of(reply), "259.75");

        let err = request(&teller, RequestKind::Withdraw, "1002", Some("99999.99")).unwrap_err();
        assert_eq!(err, RequestError::Ledger(LedgerError::InsufficientFunds));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "insufficient funds");

        let reply = request(&teller, RequestKind::Balance, "1002", None);
        assert_eq!(balance_of(reply), "259.75");
    }

    #[test]
    fn unknown_account_is_not_found() {
        let teller = teller();
        for (kind, amount) in [
            (RequestKind::Balance, None),
            (RequestKind::Deposit, Some("1.00")),
            (RequestKind::Withdraw, Some("1.00")),
        ] {
            let err = request(&teller, kind, "9999", amount).unwrap_err();
            assert_eq!(err.status_code(), 404);
            assert_eq!(err.to_string(), "account not found");
        }
    }

    #[test]
    fn invalid_amount_never_reaches_ledger() {
        let teller = teller();
        for amount in ["1.234", "-5.00", "0.00", "abc"] {
            let err = request(&teller, RequestKind::Deposit, "1001", Some(amount)).unwrap_err();
            assert!(matches!(err, RequestError::Validation(_)), "{amount}");
            assert_eq!(err.status_code(), 422);
        }
        // validation wins even for unknown accounts
        let err = request(&teller, RequestKind::Deposit, "9999", Some("abc")).unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert_eq!(teller.ledger().get_balance("1001"), Ok(100000));
    }

    #[test]
    fn withdraw_exact_balance() {
        let teller = teller();
        let reply = request(&teller, RequestKind::Withdraw, "1004", Some("500.00"));
        assert_eq!(balance_of(reply), "0.00");
    }

    #[test]
    fn open_account() {
        let teller = teller();
        assert_eq!(
            request(&teller, RequestKind::Open, "2001", Some("5")),
            Ok(Reply::Opened {
                account_number: "2001".into()
            })
        );
        let reply = request(&teller, RequestKind::Balance, "2001", None);
        assert_eq!(balance_of(reply), "5.00");
        let err = request(&teller, RequestKind::Open, "2001", Some("0")).unwrap_err();
        assert_eq!(err.to_string(), "account already exists");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn health_and_info_replies() {
        let teller = teller();
        let health = serde_json::to_value(teller.health()).unwrap();
        assert_eq!(
            health,
            serde_json::json!({"status": "ok", "accounts": ["1001", "1002", "1003", "1004"]})
        );

        let info = serde_json::to_value(teller.info()).unwrap();
        assert_eq!(info["message"], "Mini ATM Server");
        assert_eq!(info["docs"], "/docs");
        assert_eq!(info["sample_accounts"]["1001"], "1000.00");
        assert_eq!(info["sample_accounts"]["1002"], "250.50");
    }

    #[test]
    fn balance_reply_shape() {
        let teller = teller();
        let reply = serde_json::to_value(teller.balance("1001".into()).unwrap()).unwrap();
        assert_eq!(
            reply,
            serde_json::json!({"account_number": "1001", "balance": "1000.00"})
        );
    }

    #[test]
    fn concurrent_requests_through_teller() {
        let teller = teller();
        std::thread::scope(|s| {
            for _ in 0..20 {
                let teller = teller.clone();
                s.spawn(move || {
                    request(&teller, RequestKind::Deposit, "1003", Some("1.00")).unwrap();
                });
            }
        });
        let reply = request(&teller, RequestKind::Balance, "1003", None);
        assert_eq!(balance_of(reply), "20.00");
    }
}
