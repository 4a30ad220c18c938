use std::io::Read;

use crate::{command::RequestKind, ledger::AccountNumber};
use csv::{DeserializeRecordsIntoIter, Trim};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RequestRow {
    #[serde(rename = "op")]
    pub kind: RequestKind,
    pub account: AccountNumber,
    pub amount: Option<String>,
}

/// Parses request rows in CSV format (`op,account,amount`).
pub struct CsvRequestParser<R> {
    iter: DeserializeRecordsIntoIter<R, RequestRow>,
}

impl<R> CsvRequestParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_deserialize(),
        }
    }
}

impl<R> Iterator for CsvRequestParser<R>
where
    R: Read,
{
    type Item = (u64, csv::Result<RequestRow>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_and_without_amount() {
        let input = "op,account,amount\ndeposit, 1001 ,10.50\nbalance,1001,\nbalance,1002\n";
        let rows: Vec<_> = CsvRequestParser::new(input.as_bytes())
            .map(|(_, row)| row.unwrap())
            .collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].kind, RequestKind::Deposit);
        assert_eq!(rows[0].account, "1001");
        assert_eq!(rows[0].amount.as_deref(), Some("10.50"));
        assert_eq!(rows[1].amount, None);
        assert_eq!(rows[2].amount, None);
    }

    #[test]
    fn unknown_op_is_an_error() {
        let input = "op,account,amount\ntransfer,1001,1.00\n";
        let mut parser = CsvRequestParser::new(input.as_bytes());
        let (_, row) = parser.next().unwrap();
        assert!(row.is_err());
    }
}
