//! Core contracts for papertrade.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - The portfolio ledger and its trade rules
//! - The CSV save-file codec and atomic persistence
//! - The quote source contract, Yahoo and simulated sources, and the trading desk

pub mod adapters;
pub mod desk;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod ledger;
pub mod literal;
pub mod session;
pub mod source;
pub mod store;

pub use adapters::{SimulatedSource, YahooSource};
pub use desk::{HistoryReport, HistoryRow, TradeError};
pub use domain::{
    AssetClass, HistoryPeriod, Instrument, PeriodUnit, Price, PriceHistory, PricePoint, Quote,
    Symbol, TradingDay,
};
pub use error::ValidationError;
pub use ledger::{Fill, Ledger, Snapshot, Trade, TradeAction, TradeRejection, STARTING_CASH};
pub use session::Session;
pub use source::{QuoteSource, SourceError, SourceErrorKind};
pub use store::{SaveFile, StoreConfig, StoreError, DEFAULT_SAVE_FILE_NAME, SAVE_HEADER};
