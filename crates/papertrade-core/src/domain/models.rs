use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{HistoryPeriod, Symbol, TradingDay, ValidationError};

/// Strictly positive per-share price with at most [`Price::MAX_SCALE`]
/// decimal places, so share amounts stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const MAX_SCALE: u32 = 8;

    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice {
                value: value.to_string(),
            });
        }
        let value = value.normalize();
        if value.scale() > Self::MAX_SCALE {
            return Err(ValidationError::PriceTooPrecise {
                value: value.to_string(),
                max_scale: Self::MAX_SCALE,
            });
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for Price {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = Decimal::from_str(value.trim()).map_err(|_| {
            ValidationError::NonPositivePrice {
                value: value.to_owned(),
            }
        })?;
        Self::new(parsed)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

/// Canonical instrument class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equity,
    Etf,
    Fund,
    Index,
    Crypto,
    Forex,
    Other,
}

/// Instrument metadata returned by symbol resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: Symbol,
    pub name: String,
    pub exchange: Option<String>,
    pub asset_class: AssetClass,
}

impl Instrument {
    pub fn new(
        symbol: Symbol,
        name: impl Into<String>,
        exchange: Option<String>,
        asset_class: AssetClass,
    ) -> Self {
        Self {
            symbol,
            name: name.into(),
            exchange,
            asset_class,
        }
    }
}

/// Latest price for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: Price,
}

/// Closing price on one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: TradingDay,
    pub close: Price,
}

/// Ordered closing prices for a symbol over a lookback window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: Symbol,
    pub period: HistoryPeriod,
    pub points: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn new(symbol: Symbol, period: HistoryPeriod, points: Vec<PricePoint>) -> Self {
        Self {
            symbol,
            period,
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Day-over-day change in closing price. The first entry has no prior
    /// close and is reported as zero.
    pub fn daily_changes(&self) -> Vec<Decimal> {
        let mut previous: Option<Decimal> = None;
        self.points
            .iter()
            .map(|point| {
                let close = point.close.value();
                let change = previous.map_or(Decimal::ZERO, |prev| close - prev);
                previous = Some(close);
                change
            })
            .collect()
    }
}
