//! Portfolio ledger: cash balance, share holdings and lookup history.
//!
//! The [`Ledger`] is the only owner of portfolio state. Every mutation goes
//! through [`Ledger::buy`], [`Ledger::sell`] or [`Ledger::record_lookup`], and
//! a rejected trade leaves the ledger exactly as it was.
//!
//! ```rust
//! use papertrade_core::{Ledger, Symbol, TradeRejection};
//! use rust_decimal::Decimal;
//!
//! let mut ledger = Ledger::new();
//! let aapl = Symbol::parse("AAPL").unwrap();
//!
//! ledger.buy(&aapl, 5, Decimal::from(100)).unwrap();
//! assert_eq!(ledger.cash(), Decimal::from(500));
//!
//! let err = ledger.sell(&aapl, 10, Decimal::from(100)).unwrap_err();
//! assert!(matches!(err, TradeRejection::InsufficientShares { .. }));
//! assert_eq!(ledger.holding(&aapl), 5);
//! ```

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{Price, Symbol, ValidationError};

/// Cash balance of a fresh ledger.
pub const STARTING_CASH: Decimal = Decimal::ONE_THOUSAND;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl Display for TradeAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(format!("invalid trade action '{other}', expected buy or sell")),
        }
    }
}

/// A validated trade request. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    pub action: TradeAction,
    pub symbol: Symbol,
    pub quantity: u64,
    pub unit_price: Price,
}

impl Trade {
    pub fn new(
        action: TradeAction,
        symbol: Symbol,
        quantity: u64,
        unit_price: Decimal,
    ) -> Result<Self, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }
        Ok(Self {
            action,
            symbol,
            quantity,
            unit_price: Price::new(unit_price)?,
        })
    }
}

/// Outcome of an executed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fill {
    pub action: TradeAction,
    pub symbol: Symbol,
    pub quantity: u64,
    pub unit_price: Price,
    /// Cash paid for a buy or received for a sell.
    pub amount: Decimal,
    pub cash_after: Decimal,
    pub shares_after: u64,
}

/// Expected, recoverable reasons a trade does not execute.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TradeRejection {
    #[error("trade quantity must be greater than zero")]
    InvalidQuantity,
    #[error("trade price must be positive with at most 8 decimal places, got {price}")]
    InvalidPrice { price: Decimal },
    #[error("not enough cash: {required} required, {available} available")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },
    #[error("not enough shares of {symbol}: {requested} requested, {held} held")]
    InsufficientShares {
        symbol: Symbol,
        requested: u64,
        held: u64,
    },
    #[error("trade amount cannot be represented exactly in the ledger")]
    AmountOverflow,
}

impl TradeRejection {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity => "trade.invalid_quantity",
            Self::InvalidPrice { .. } => "trade.invalid_price",
            Self::InsufficientFunds { .. } => "trade.insufficient_funds",
            Self::InsufficientShares { .. } => "trade.insufficient_shares",
            Self::AmountOverflow => "trade.amount_overflow",
        }
    }
}

/// Durable projection of a ledger: cash, holdings and lookups at one moment.
///
/// Only constructible through [`Snapshot::new`], which enforces the same
/// invariants the ledger does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    cash: Decimal,
    holdings: BTreeMap<Symbol, u64>,
    lookups: Vec<String>,
}

impl Snapshot {
    pub fn new(
        cash: Decimal,
        holdings: BTreeMap<Symbol, u64>,
        lookups: Vec<String>,
    ) -> Result<Self, ValidationError> {
        if cash < Decimal::ZERO {
            return Err(ValidationError::NegativeCash {
                value: cash.to_string(),
            });
        }
        if let Some((symbol, _)) = holdings.iter().find(|(_, count)| **count == 0) {
            return Err(ValidationError::EmptyHolding {
                symbol: symbol.to_string(),
            });
        }
        Ok(Self {
            cash,
            holdings,
            lookups,
        })
    }

    /// Fresh state: the given cash, nothing held, nothing looked up.
    pub fn starting(cash: Decimal) -> Result<Self, ValidationError> {
        Self::new(cash, BTreeMap::new(), Vec::new())
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn holdings(&self) -> &BTreeMap<Symbol, u64> {
        &self.holdings
    }

    pub fn lookups(&self) -> &[String] {
        &self.lookups
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            cash: STARTING_CASH,
            holdings: BTreeMap::new(),
            lookups: Vec::new(),
        }
    }
}

/// In-memory portfolio state for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    cash: Decimal,
    holdings: BTreeMap<Symbol, u64>,
    lookups: Vec<String>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::from_snapshot(Snapshot::default())
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let Snapshot {
            cash,
            holdings,
            lookups,
        } = snapshot;
        Self {
            cash,
            holdings,
            lookups,
        }
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn holdings(&self) -> &BTreeMap<Symbol, u64> {
        &self.holdings
    }

    /// Shares held of `symbol`, zero when nothing is held.
    pub fn holding(&self, symbol: &Symbol) -> u64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    pub fn lookups(&self) -> &[String] {
        &self.lookups
    }

    /// Buy `quantity` shares at `unit_price`, all or nothing.
    pub fn buy(
        &mut self,
        symbol: &Symbol,
        quantity: u64,
        unit_price: Decimal,
    ) -> Result<Fill, TradeRejection> {
        let price = check_trade_inputs(quantity, unit_price)?;

        let cost = trade_amount(quantity, price)?;
        if cost > self.cash {
            debug!(%symbol, quantity, %cost, cash = %self.cash, "buy rejected: insufficient funds");
            return Err(TradeRejection::InsufficientFunds {
                required: cost,
                available: self.cash,
            });
        }
        let shares_after = self
            .holding(symbol)
            .checked_add(quantity)
            .ok_or(TradeRejection::AmountOverflow)?;
        let cash_after = exact(self.cash.checked_sub(cost), self.cash, cost)?;

        self.cash = cash_after;
        self.holdings.insert(symbol.clone(), shares_after);
        info!(%symbol, quantity, %price, cash = %self.cash, "bought shares");

        Ok(Fill {
            action: TradeAction::Buy,
            symbol: symbol.clone(),
            quantity,
            unit_price: price,
            amount: cost,
            cash_after,
            shares_after,
        })
    }

    /// Sell `quantity` held shares at `unit_price`. A holding that reaches
    /// zero is removed.
    pub fn sell(
        &mut self,
        symbol: &Symbol,
        quantity: u64,
        unit_price: Decimal,
    ) -> Result<Fill, TradeRejection> {
        let price = check_trade_inputs(quantity, unit_price)?;

        let held = self.holding(symbol);
        if held < quantity {
            debug!(%symbol, quantity, held, "sell rejected: insufficient shares");
            return Err(TradeRejection::InsufficientShares {
                symbol: symbol.clone(),
                requested: quantity,
                held,
            });
        }
        let proceeds = trade_amount(quantity, price)?;
        let cash_after = exact(self.cash.checked_add(proceeds), self.cash, proceeds)?;

        let shares_after = held - quantity;
        self.cash = cash_after;
        if shares_after == 0 {
            self.holdings.remove(symbol);
        } else {
            self.holdings.insert(symbol.clone(), shares_after);
        }
        info!(%symbol, quantity, %price, cash = %self.cash, "sold shares");

        Ok(Fill {
            action: TradeAction::Sell,
            symbol: symbol.clone(),
            quantity,
            unit_price: price,
            amount: proceeds,
            cash_after,
            shares_after,
        })
    }

    pub fn apply(&mut self, trade: &Trade) -> Result<Fill, TradeRejection> {
        let price = trade.unit_price.value();
        match trade.action {
            TradeAction::Buy => self.buy(&trade.symbol, trade.quantity, price),
            TradeAction::Sell => self.sell(&trade.symbol, trade.quantity, price),
        }
    }

    /// Append a trimmed, lowercased lookup query to the history.
    pub fn record_lookup(&mut self, raw_query: &str) {
        self.lookups.push(raw_query.trim().to_lowercase());
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cash: self.cash,
            holdings: self.holdings.clone(),
            lookups: self.lookups.clone(),
        }
    }

    /// Replace cash, holdings and lookups with the snapshot's.
    pub fn restore(&mut self, snapshot: Snapshot) {
        *self = Self::from_snapshot(snapshot);
    }
}

fn check_trade_inputs(quantity: u64, unit_price: Decimal) -> Result<Price, TradeRejection> {
    if quantity == 0 {
        return Err(TradeRejection::InvalidQuantity);
    }
    Price::new(unit_price).map_err(|_| TradeRejection::InvalidPrice { price: unit_price })
}

/// `quantity * price`, refused when it does not fit without rounding.
fn trade_amount(quantity: u64, price: Price) -> Result<Decimal, TradeRejection> {
    let unit_price = price.value();
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .filter(|amount| amount.scale() == unit_price.scale())
        .ok_or(TradeRejection::AmountOverflow)
}

/// rust_decimal drops fractional digits when a sum needs more than 28
/// significant digits; an exact sum keeps the larger operand scale.
fn exact(sum: Option<Decimal>, lhs: Decimal, rhs: Decimal) -> Result<Decimal, TradeRejection> {
    sum.filter(|value| value.scale() == lhs.scale().max(rhs.scale()))
        .ok_or(TradeRejection::AmountOverflow)
}
