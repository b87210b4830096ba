use papertrade_core::{desk, Fill, Ledger, QuoteSource, Symbol, TradeAction, TradeError};
use serde::Serialize;

use crate::cli::TradeArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct FilledResponseData {
    status: &'static str,
    fill: Fill,
}

#[derive(Debug, Serialize)]
struct RejectedResponseData {
    status: &'static str,
    action: TradeAction,
    symbol: Symbol,
    quantity: u64,
    code: &'static str,
    reason: String,
}

pub fn run(
    ledger: &mut Ledger,
    source: &dyn QuoteSource,
    action: TradeAction,
    args: &TradeArgs,
) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;

    match desk::execute(ledger, source, action, &symbol, args.quantity) {
        Ok(fill) => {
            let data = serde_json::to_value(FilledResponseData {
                status: "filled",
                fill,
            })?;
            Ok(CommandResult::ok(data))
        }
        Err(TradeError::Rejected(rejection)) => {
            let data = serde_json::to_value(RejectedResponseData {
                status: "rejected",
                action,
                symbol,
                quantity: args.quantity,
                code: rejection.code(),
                reason: rejection.to_string(),
            })?;
            Ok(CommandResult::rejected(data, rejection))
        }
        Err(error) => Err(error.into()),
    }
}
