//! Trading desk: provider-backed operations over a [`Ledger`].
//!
//! A trade never executes without a confirmed price. When the quote source
//! fails, [`execute`] returns [`TradeError::PriceUnavailable`] and the ledger
//! is not touched.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::source::{QuoteSource, SourceError};
use crate::{
    Fill, HistoryPeriod, Instrument, Ledger, Price, Symbol, TradeAction, TradeRejection,
    TradingDay,
};

/// Why a desk trade did not execute.
#[derive(Debug, Error)]
pub enum TradeError {
    #[error("no confirmed price for {symbol}: {source}")]
    PriceUnavailable {
        symbol: Symbol,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    Rejected(#[from] TradeRejection),
}

impl TradeError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PriceUnavailable { .. } => "trade.price_unavailable",
            Self::Rejected(rejection) => rejection.code(),
        }
    }
}

/// Trade at the source's current price.
pub fn execute<S>(
    ledger: &mut Ledger,
    source: &S,
    action: TradeAction,
    symbol: &Symbol,
    quantity: u64,
) -> Result<Fill, TradeError>
where
    S: QuoteSource + ?Sized,
{
    if quantity == 0 {
        return Err(TradeRejection::InvalidQuantity.into());
    }

    let quote = source.fetch_price(symbol).map_err(|error| {
        warn!(
            %symbol,
            source = source.name(),
            code = error.code(),
            reason = error.message(),
            "price unavailable"
        );
        TradeError::PriceUnavailable {
            symbol: symbol.clone(),
            source: error,
        }
    })?;

    execute_at(ledger, action, symbol, quantity, quote.price.value())
}

/// Trade at a price the caller already confirmed. Front ends go through
/// [`execute`] so a player can never name their own price.
pub fn execute_at(
    ledger: &mut Ledger,
    action: TradeAction,
    symbol: &Symbol,
    quantity: u64,
    unit_price: Decimal,
) -> Result<Fill, TradeError> {
    let fill = match action {
        TradeAction::Buy => ledger.buy(symbol, quantity, unit_price),
        TradeAction::Sell => ledger.sell(symbol, quantity, unit_price),
    }?;
    Ok(fill)
}

/// Record the query in the ledger's lookup history, then resolve it.
///
/// The lookup is recorded even when resolution fails.
pub fn lookup<S>(
    ledger: &mut Ledger,
    source: &S,
    raw_query: &str,
) -> Result<Instrument, SourceError>
where
    S: QuoteSource + ?Sized,
{
    ledger.record_lookup(raw_query);
    let query = raw_query.trim();
    source
        .resolve_symbol(query)
        .inspect_err(|error| {
            debug!(query, code = error.code(), reason = error.message(), "lookup failed");
        })
}

/// One row of a history report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub date: TradingDay,
    pub close: Price,
    /// Change from the previous close; zero on the first row.
    pub change: Decimal,
}

/// Closing prices and daily changes over a lookback window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryReport {
    pub symbol: Symbol,
    pub period: HistoryPeriod,
    pub rows: Vec<HistoryRow>,
}

impl HistoryReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn history<S>(
    source: &S,
    symbol: &Symbol,
    period: HistoryPeriod,
) -> Result<HistoryReport, SourceError>
where
    S: QuoteSource + ?Sized,
{
    let series = source.fetch_history(symbol, period)?;
    let changes = series.daily_changes();
    let rows = series
        .points
        .iter()
        .zip(changes)
        .map(|(point, change)| HistoryRow {
            date: point.date,
            close: point.close,
            change,
        })
        .collect();

    Ok(HistoryReport {
        symbol: series.symbol,
        period: series.period,
        rows,
    })
}
