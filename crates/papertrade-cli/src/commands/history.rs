use papertrade_core::{desk, HistoryPeriod, QuoteSource, Symbol};
use tracing::warn;

use crate::cli::HistoryArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(source: &dyn QuoteSource, args: &HistoryArgs) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let period = HistoryPeriod::parse(&args.period, args.count)?;

    let report = desk::history(source, &symbol, period)?;
    if report.is_empty() {
        warn!(%symbol, %period, source = source.name(), "no price history");
    }

    let data = serde_json::to_value(report)?;
    Ok(CommandResult::ok(data))
}

#[cfg(test)]
mod tests {
    use papertrade_core::{SimulatedSource, TradingDay};

    use super::*;

    fn args(symbol: &str, period: &str, count: u32) -> HistoryArgs {
        HistoryArgs {
            symbol: symbol.to_owned(),
            period: period.to_owned(),
            count,
        }
    }

    #[test]
    fn reports_rows_for_a_listed_symbol() {
        let source = SimulatedSource::anchored_at(TradingDay::parse("2024-03-08").expect("date"));

        let result = run(&source, &args("spy", "days", 5)).expect("history");

        assert_eq!(result.data["symbol"], "SPY");
        assert_eq!(result.data["period"]["count"], 5);
        assert_eq!(result.data["rows"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn unknown_symbol_is_an_empty_report_not_an_error() {
        let source = SimulatedSource::default();

        let result = run(&source, &args("NOPE", "d", 5)).expect("history");

        assert!(result.rejection.is_none());
        assert_eq!(result.data["rows"], serde_json::json!([]));
    }

    #[test]
    fn unknown_period_unit_is_a_validation_error() {
        let source = SimulatedSource::default();

        let error = run(&source, &args("SPY", "weeks", 2)).err().expect("must fail");
        assert_eq!(error.exit_code(), 2);
    }
}
