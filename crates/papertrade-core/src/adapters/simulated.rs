use rust_decimal::Decimal;
use time::Duration;

use crate::source::{QuoteSource, SourceError};
use crate::{
    AssetClass, HistoryPeriod, Instrument, Price, PriceHistory, PricePoint, Quote, Symbol,
    TradingDay, ValidationError,
};

/// Longest history window the simulator will generate.
const MAX_HISTORY_DAYS: u32 = 365 * 50;

const CATALOG: [(&str, &str, Option<&str>, AssetClass); 10] = [
    ("AAPL", "Apple Inc.", Some("NASDAQ"), AssetClass::Equity),
    ("MSFT", "Microsoft Corporation", Some("NASDAQ"), AssetClass::Equity),
    ("GOOGL", "Alphabet Inc.", Some("NASDAQ"), AssetClass::Equity),
    ("AMZN", "Amazon.com, Inc.", Some("NASDAQ"), AssetClass::Equity),
    ("TSLA", "Tesla, Inc.", Some("NASDAQ"), AssetClass::Equity),
    ("BRK.B", "Berkshire Hathaway Inc. Class B", Some("NYSE"), AssetClass::Equity),
    ("SPY", "SPDR S&P 500 ETF Trust", Some("ARCA"), AssetClass::Etf),
    ("QQQ", "Invesco QQQ Trust", Some("NASDAQ"), AssetClass::Etf),
    ("^GSPC", "S&P 500 Index", None, AssetClass::Index),
    ("EURUSD=X", "Euro / US Dollar", Some("CCY"), AssetClass::Forex),
];

/// Deterministic offline quote source with a small instrument catalog.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    reachable: bool,
    anchor: TradingDay,
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self {
            reachable: true,
            anchor: TradingDay::today(),
        }
    }
}

impl SimulatedSource {
    /// A source whose every call fails as unavailable.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::default()
        }
    }

    /// History windows end on `anchor` instead of today.
    pub fn anchored_at(anchor: TradingDay) -> Self {
        Self {
            anchor,
            ..Self::default()
        }
    }

    pub fn catalog() -> Vec<Instrument> {
        CATALOG
            .iter()
            .filter_map(|(symbol, name, exchange, asset_class)| {
                let symbol = Symbol::parse(symbol).ok()?;
                Some(Instrument::new(
                    symbol,
                    *name,
                    exchange.map(str::to_owned),
                    *asset_class,
                ))
            })
            .collect()
    }

    fn ensure_reachable(&self) -> Result<(), SourceError> {
        if self.reachable {
            Ok(())
        } else {
            Err(SourceError::unavailable("simulated source is unreachable"))
        }
    }

    fn listed(&self, symbol: &Symbol) -> bool {
        CATALOG.iter().any(|(listed, ..)| *listed == symbol.as_str())
    }
}

impl QuoteSource for SimulatedSource {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn fetch_price(&self, symbol: &Symbol) -> Result<Quote, SourceError> {
        self.ensure_reachable()?;
        if !self.listed(symbol) {
            return Err(SourceError::symbol_not_found(symbol.as_str()));
        }

        let seed = symbol_seed(symbol);
        let price = Decimal::new(9_200 + (seed % 5_000) as i64, 2);
        Ok(Quote {
            symbol: symbol.clone(),
            price: Price::new(price).map_err(validation_to_error)?,
        })
    }

    fn fetch_history(
        &self,
        symbol: &Symbol,
        period: HistoryPeriod,
    ) -> Result<PriceHistory, SourceError> {
        self.ensure_reachable()?;
        if !self.listed(symbol) {
            return Ok(PriceHistory::new(symbol.clone(), period, Vec::new()));
        }

        let span = period.calendar_days();
        if span > MAX_HISTORY_DAYS {
            return Err(SourceError::invalid_request(format!(
                "history period {period} exceeds the simulated archive"
            )));
        }

        let seed = symbol_seed(symbol);
        let anchor = self.anchor.into_inner();
        let mut points = Vec::with_capacity(span as usize);
        for offset in (0..span).rev() {
            let date = anchor
                .checked_sub(Duration::days(i64::from(offset)))
                .map(TradingDay::from_date)
                .ok_or_else(|| SourceError::internal("history date out of range"))?;
            if date.is_weekend() {
                continue;
            }

            let index = u64::from(span - offset);
            let close = Decimal::new(9_000 + (seed.wrapping_add(index * 7) % 3_500) as i64, 2);
            points.push(PricePoint {
                date,
                close: Price::new(close).map_err(validation_to_error)?,
            });
        }

        Ok(PriceHistory::new(symbol.clone(), period, points))
    }

    fn resolve_symbol(&self, query: &str) -> Result<Instrument, SourceError> {
        self.ensure_reachable()?;
        let query = query.trim();
        if query.is_empty() {
            return Err(SourceError::invalid_request("lookup query must not be empty"));
        }

        let query_lower = query.to_lowercase();
        let catalog = Self::catalog();
        let exact = catalog
            .iter()
            .find(|instrument| instrument.symbol.as_str().to_lowercase() == query_lower);
        let partial = || {
            catalog.iter().find(|instrument| {
                instrument.symbol.as_str().to_lowercase().contains(&query_lower)
                    || instrument.name.to_lowercase().contains(&query_lower)
            })
        };

        exact
            .or_else(partial)
            .cloned()
            .ok_or_else(|| SourceError::symbol_not_found(query))
    }
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::internal(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceErrorKind;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn catalog_symbols_all_parse() {
        assert_eq!(SimulatedSource::catalog().len(), CATALOG.len());
    }

    #[test]
    fn prices_are_deterministic_per_symbol() {
        let source = SimulatedSource::default();
        let first = source.fetch_price(&symbol("AAPL")).expect("price");
        let second = source.fetch_price(&symbol("aapl")).expect("price");
        assert_eq!(first, second);
        assert!(first.price.value() >= Decimal::new(9_200, 2));
    }

    #[test]
    fn unknown_symbol_has_no_price_and_empty_history() {
        let source = SimulatedSource::default();
        let err = source.fetch_price(&symbol("ZZZZ")).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::SymbolNotFound);

        let period = HistoryPeriod::parse("days", 5).expect("period");
        let history = source.fetch_history(&symbol("ZZZZ"), period).expect("history");
        assert!(history.is_empty());
    }

    #[test]
    fn history_skips_weekends_and_ends_at_anchor() {
        // 2024-03-08 is a Friday; the ten days ending there include one weekend.
        let anchor = TradingDay::parse("2024-03-08").expect("date");
        let source = SimulatedSource::anchored_at(anchor);
        let period = HistoryPeriod::parse("days", 10).expect("period");

        let history = source.fetch_history(&symbol("MSFT"), period).expect("history");
        assert_eq!(history.points.len(), 8);
        assert!(history.points.iter().all(|point| !point.date.is_weekend()));
        assert_eq!(history.points.last().map(|point| point.date), Some(anchor));
        assert!(history
            .points
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date));
    }

    #[test]
    fn rejects_oversized_history_window() {
        let source = SimulatedSource::default();
        let period = HistoryPeriod::parse("years", 80).expect("period");
        let err = source.fetch_history(&symbol("SPY"), period).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
    }

    #[test]
    fn resolves_by_symbol_or_name() {
        let source = SimulatedSource::default();
        assert_eq!(
            source.resolve_symbol("apple").expect("resolve").symbol.as_str(),
            "AAPL"
        );
        assert_eq!(
            source.resolve_symbol(" brk.b ").expect("resolve").symbol.as_str(),
            "BRK.B"
        );
        let err = source.resolve_symbol("nonexistent co").expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::SymbolNotFound);
        assert!(!err.retryable());
    }

    #[test]
    fn unreachable_source_fails_every_call() {
        let source = SimulatedSource::unreachable();
        let period = HistoryPeriod::parse("days", 1).expect("period");

        for err in [
            source.fetch_price(&symbol("AAPL")).expect_err("must fail"),
            source.fetch_history(&symbol("AAPL"), period).expect_err("must fail"),
            source.resolve_symbol("apple").expect_err("must fail"),
        ] {
            assert_eq!(err.kind(), SourceErrorKind::Unavailable);
            assert!(err.retryable());
        }
    }
}
