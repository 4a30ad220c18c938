use std::io::Write;

use crate::ledger::AccountNumber;
use anyhow::Context;
use csv::Writer;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AccountRow {
    pub account: AccountNumber,
    pub balance: String,
}

/// Writes the account listing as `account,balance` CSV.
pub fn print_accounts<W>(
    output: &mut W,
    accounts: impl IntoIterator<Item = AccountRow>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for row in accounts {
        let account = row.account.clone();
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write account `{account}` to CSV"))?;
    }
    writer.flush().context("Failed to flush CSV writer")
}
