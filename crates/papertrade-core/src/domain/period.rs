use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Calendar unit for a history lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    Days,
    Months,
    Years,
}

impl PeriodUnit {
    pub const ALL: [Self; 3] = [Self::Days, Self::Months, Self::Years];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Months => "months",
            Self::Years => "years",
        }
    }

    /// Accepted spellings, case-insensitive.
    pub const fn spellings(self) -> [&'static str; 3] {
        match self {
            Self::Days => ["days", "day", "d"],
            Self::Months => ["months", "month", "mo"],
            Self::Years => ["years", "year", "y"],
        }
    }

    /// Suffix used by quote providers in period strings such as `5d` or `3mo`.
    pub const fn shorthand(self) -> &'static str {
        match self {
            Self::Days => "d",
            Self::Months => "mo",
            Self::Years => "y",
        }
    }
}

impl Display for PeriodUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodUnit {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|unit| unit.spellings().contains(&wanted.as_str()))
            .ok_or(ValidationError::InvalidPeriodUnit { value: wanted })
    }
}

/// Lookback window for a price history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryPeriod {
    pub unit: PeriodUnit,
    pub count: u32,
}

impl HistoryPeriod {
    pub fn new(unit: PeriodUnit, count: u32) -> Result<Self, ValidationError> {
        if count == 0 {
            return Err(ValidationError::InvalidPeriodCount);
        }
        Ok(Self { unit, count })
    }

    /// Parse free-text unit and count, e.g. `("months", 3)`.
    pub fn parse(unit: &str, count: u32) -> Result<Self, ValidationError> {
        Self::new(PeriodUnit::from_str(unit)?, count)
    }

    /// Approximate number of calendar days covered by the window.
    pub fn calendar_days(self) -> u32 {
        let per_unit = match self.unit {
            PeriodUnit::Days => 1,
            PeriodUnit::Months => 30,
            PeriodUnit::Years => 365,
        };
        self.count.saturating_mul(per_unit)
    }
}

impl Display for HistoryPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.count, self.unit.shorthand())
    }
}
