//! CSV batch front-end: replays request rows against a [`Teller`] and prints
//! the resulting account listing.

use std::io::{Read, Write};

use crate::{
    command::Command,
    ledger::BalanceLedger,
    teller::{RequestError, Teller},
};
use anyhow::Result;
use csv_parser::CsvRequestParser;
use csv_printer::{AccountRow, print_accounts};
use thiserror::Error;
use tracing::debug;
pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum LineError {
    #[error("malformed row: {0}")]
    Malformed(#[from] csv::Error),
    #[error(transparent)]
    Request(#[from] RequestError),
}

pub struct Service<'w, R, W: 'w, L> {
    pub input: R,
    pub output: &'w mut W,
    pub teller: Teller<L>,
    pub error_printer: Box<dyn FnMut(u64, LineError)>,
}

impl<'w, R, W, L> Service<'w, R, W, L>
where
    R: Read,
    W: Write + 'w,
    L: BalanceLedger,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvRequestParser::new(self.input);

        for (line, row) in parser {
            let outcome = row.map_err(LineError::from).and_then(|row| {
                let command = Command::parse(row.kind, row.account, row.amount.as_deref())
                    .map_err(RequestError::from)?;
                Ok(self.teller.handle(command)?)
            });
            match outcome {
                Ok(reply) => debug!(line, ?reply, "request served"),
                Err(err) => (self.error_printer)(line, err),
            }
        }

        print_accounts(
            self.output,
            self.teller
                .ledger()
                .snapshot()
                .into_iter()
                .map(|(account, balance)| AccountRow { account, balance }),
        )
    }
}
