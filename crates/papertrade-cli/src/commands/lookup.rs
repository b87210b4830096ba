use papertrade_core::{desk, Instrument, Ledger, QuoteSource};
use serde::Serialize;

use crate::cli::LookupArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct LookupResponseData {
    query: String,
    instrument: Instrument,
}

pub fn run(
    ledger: &mut Ledger,
    source: &dyn QuoteSource,
    args: &LookupArgs,
) -> Result<CommandResult, CliError> {
    let query = args.joined();
    let instrument = desk::lookup(ledger, source, &query)?;

    let data = serde_json::to_value(LookupResponseData { query, instrument })?;
    Ok(CommandResult::ok(data))
}
