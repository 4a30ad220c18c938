use std::{fs::File, sync::Arc};

use anyhow::{Context, Result};
use atm_ledger::{
    bin_utils::{LineError, Service},
    ledger::in_memory::InMemoryLedger,
    seed,
    teller::Teller,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let filename = std::env::args()
        .nth(1)
        .context("Expected a file name as the first argument")?;
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;

    let accounts = seed::from_env()?;
    let ledger = InMemoryLedger::new(accounts).context("Invalid seed accounts")?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        teller: Teller::new(Arc::new(ledger)),
        error_printer: Box::new(|line, err| match &err {
            LineError::Malformed(_) => eprintln!("Error at line {line}: {err}"),
            LineError::Request(request) => {
                eprintln!("Error at line {line} ({}): {err}", request.status_code())
            }
        }),
    };
    service.run()
}
