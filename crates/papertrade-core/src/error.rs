use thiserror::Error;

/// Validation errors for domain input exposed by `papertrade-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter, digit or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid period unit '{value}', expected one of days, months, years")]
    InvalidPeriodUnit { value: String },
    #[error("period count must be greater than zero")]
    InvalidPeriodCount,

    #[error("date must be formatted YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("price must be a positive decimal: '{value}'")]
    NonPositivePrice { value: String },
    #[error("price '{value}' has more than {max_scale} decimal places")]
    PriceTooPrecise { value: String, max_scale: u32 },
    #[error("cash balance must be non-negative: '{value}'")]
    NegativeCash { value: String },
    #[error("trade quantity must be greater than zero")]
    ZeroQuantity,
    #[error("holding for '{symbol}' must have a positive share count")]
    EmptyHolding { symbol: String },
}
