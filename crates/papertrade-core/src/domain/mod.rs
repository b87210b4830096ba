//! # Domain Models
//!
//! Strongly-typed values shared by the ledger, the save-file codec and the
//! quote sources. Construction validates every invariant, so a `Symbol` is
//! always normalized and a `Price` is always positive.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Uppercase instrument symbol |
//! | [`Price`] | Positive per-share price |
//! | [`Quote`] | Latest price for a symbol |
//! | [`PriceHistory`] | Closing prices over a [`HistoryPeriod`] |
//! | [`Instrument`] | Result of symbol resolution |
//! | [`TradingDay`] | `YYYY-MM-DD` calendar date |

mod models;
mod period;
mod symbol;
mod trading_day;

pub use models::{AssetClass, Instrument, Price, PriceHistory, PricePoint, Quote};
pub use period::{HistoryPeriod, PeriodUnit};
pub use symbol::Symbol;
pub use trading_day::TradingDay;
