//! Quote source contract.
//!
//! Prices, history and symbol resolution come from an external provider. The
//! ledger never calls a provider itself; the [`desk`](crate::desk) functions
//! fetch a price through a [`QuoteSource`] and hand it to the ledger.
//!
//! | Operation | Response | Failure |
//! |-----------|----------|---------|
//! | `fetch_price` | [`Quote`] | `Unavailable`, `SymbolNotFound` |
//! | `fetch_history` | [`PriceHistory`] (empty for unknown symbols) | `Unavailable` |
//! | `resolve_symbol` | [`Instrument`] | `SymbolNotFound`, `Unavailable` |

use std::fmt::{Display, Formatter};

use crate::{HistoryPeriod, Instrument, PriceHistory, Quote, Symbol};

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The provider could not be reached or returned no usable answer.
    Unavailable,
    SymbolNotFound,
    InvalidRequest,
    Internal,
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn symbol_not_found(query: &str) -> Self {
        Self {
            kind: SourceErrorKind::SymbolNotFound,
            message: format!("no instrument matches '{query}'"),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::SymbolNotFound => "source.symbol_not_found",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Provider contract consumed by the trading desk. Calls are synchronous;
/// timeouts and retries belong to the implementation or its caller.
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn fetch_price(&self, symbol: &Symbol) -> Result<Quote, SourceError>;
    fn fetch_history(
        &self,
        symbol: &Symbol,
        period: HistoryPeriod,
    ) -> Result<PriceHistory, SourceError>;
    fn resolve_symbol(&self, query: &str) -> Result<Instrument, SourceError>;
}
