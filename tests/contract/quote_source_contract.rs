use std::sync::Arc;

use papertrade_core::desk;
use papertrade_core::http_client::{FixtureHttpClient, HttpResponse};
use papertrade_core::{
    AssetClass, HistoryPeriod, Instrument, Ledger, Price, PriceHistory, PricePoint, Quote,
    QuoteSource, SimulatedSource, SourceError, SourceErrorKind, Symbol, TradeAction, TradingDay,
    YahooSource,
};
use rust_decimal::Decimal;

const YAHOO_AAPL_CHART: &str = r#"{"chart":{"result":[{
    "meta":{"symbol":"AAPL","regularMarketPrice":181.17999267578125,"gmtoffset":-18000},
    "timestamp":[1704205800,1704292200,1704378600,1704465000],
    "indicators":{"quote":[{"close":[185.63999938964844,184.25,181.91000366210938,181.17999267578125]}]}
}],"error":null}}"#;

const YAHOO_APPLE_SEARCH: &str = r#"{"quotes":[
    {"symbol":"AAPL","shortname":"Apple Inc.","longname":"Apple Inc.","exchDisp":"NASDAQ","quoteType":"EQUITY"}
]}"#;

/// Yahoo adapter over canned responses recorded from the live endpoints.
fn yahoo_fixture() -> YahooSource {
    let client = FixtureHttpClient::new()
        .with_route("/chart/AAPL?", HttpResponse::ok_json(YAHOO_AAPL_CHART))
        .with_route("q=apple", HttpResponse::ok_json(YAHOO_APPLE_SEARCH))
        .with_route("/search?", HttpResponse::ok_json(r#"{"quotes":[]}"#));
    YahooSource::with_http_client(Arc::new(client))
}

/// Minimal hand-written source with one listed symbol and a fixed price.
struct FixedSource {
    symbol: Symbol,
    price: Price,
}

impl FixedSource {
    fn new() -> Self {
        Self {
            symbol: Symbol::parse("FIX").expect("valid symbol"),
            price: Price::new(Decimal::new(4_250, 2)).expect("valid price"),
        }
    }
}

impl QuoteSource for FixedSource {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn fetch_price(&self, symbol: &Symbol) -> Result<Quote, SourceError> {
        if *symbol != self.symbol {
            return Err(SourceError::symbol_not_found(symbol.as_str()));
        }
        Ok(Quote {
            symbol: symbol.clone(),
            price: self.price,
        })
    }

    fn fetch_history(
        &self,
        symbol: &Symbol,
        period: HistoryPeriod,
    ) -> Result<PriceHistory, SourceError> {
        if *symbol != self.symbol {
            return Ok(PriceHistory::new(symbol.clone(), period, Vec::new()));
        }
        let date = TradingDay::parse("2024-01-02")
            .map_err(|error| SourceError::internal(error.to_string()))?;
        Ok(PriceHistory::new(
            symbol.clone(),
            period,
            vec![PricePoint {
                date,
                close: self.price,
            }],
        ))
    }

    fn resolve_symbol(&self, query: &str) -> Result<Instrument, SourceError> {
        if query.trim().eq_ignore_ascii_case("fix") || query.to_lowercase().contains("fixed") {
            return Ok(Instrument::new(
                self.symbol.clone(),
                "Fixed Income Corp",
                None,
                AssetClass::Equity,
            ));
        }
        Err(SourceError::symbol_not_found(query))
    }
}

struct SourceCase {
    source: Arc<dyn QuoteSource>,
    listed: &'static str,
    company: &'static str,
}

fn source_cases() -> Vec<SourceCase> {
    vec![
        SourceCase {
            source: Arc::new(SimulatedSource::default()),
            listed: "AAPL",
            company: "apple",
        },
        SourceCase {
            source: Arc::new(SimulatedSource::anchored_at(
                TradingDay::parse("2023-12-29").expect("date"),
            )),
            listed: "^GSPC",
            company: "s&p 500 index",
        },
        SourceCase {
            source: Arc::new(yahoo_fixture()),
            listed: "AAPL",
            company: "apple",
        },
        SourceCase {
            source: Arc::new(FixedSource::new()),
            listed: "FIX",
            company: "Fixed Income",
        },
    ]
}

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

#[test]
fn price_is_positive_and_echoes_the_symbol_for_all_sources() {
    for case in source_cases() {
        let listed = symbol(case.listed);
        let quote = case.source.fetch_price(&listed).unwrap_or_else(|error| {
            panic!("source '{}' price failed: {error}", case.source.name())
        });

        assert_eq!(quote.symbol, listed, "source '{}': symbol", case.source.name());
        assert!(
            quote.price.value() > Decimal::ZERO,
            "source '{}': price must be positive",
            case.source.name()
        );
    }
}

#[test]
fn unknown_symbol_has_no_price_for_all_sources() {
    for case in source_cases() {
        let err = case
            .source
            .fetch_price(&symbol("UNLISTED"))
            .expect_err("unknown symbol must fail");
        assert_eq!(
            err.kind(),
            SourceErrorKind::SymbolNotFound,
            "source '{}': error kind",
            case.source.name()
        );
        assert_eq!(err.code(), "source.symbol_not_found");
    }
}

#[test]
fn history_is_ordered_and_unknown_symbols_are_empty_for_all_sources() {
    let period = HistoryPeriod::parse("days", 10).expect("period");

    for case in source_cases() {
        let history = case
            .source
            .fetch_history(&symbol(case.listed), period)
            .unwrap_or_else(|error| {
                panic!("source '{}' history failed: {error}", case.source.name())
            });
        assert!(!history.is_empty(), "source '{}': history", case.source.name());
        assert_eq!(history.period, period);
        assert!(history
            .points
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date));

        let empty = case
            .source
            .fetch_history(&symbol("UNLISTED"), period)
            .expect("unknown symbol history is empty, not an error");
        assert!(empty.is_empty(), "source '{}': empty history", case.source.name());
    }
}

#[test]
fn resolution_finds_listed_companies_for_all_sources() {
    for case in source_cases() {
        let instrument = case
            .source
            .resolve_symbol(case.company)
            .unwrap_or_else(|error| {
                panic!("source '{}' resolve failed: {error}", case.source.name())
            });
        assert_eq!(instrument.symbol.as_str(), case.listed);

        let err = case
            .source
            .resolve_symbol("zzz no such company zzz")
            .expect_err("must not resolve");
        assert_eq!(err.kind(), SourceErrorKind::SymbolNotFound);
    }
}

#[test]
fn desk_trades_at_the_source_price_for_all_sources() {
    for case in source_cases() {
        let listed = symbol(case.listed);
        let price = case.source.fetch_price(&listed).expect("price").price;
        let mut ledger = Ledger::new();

        let fill = desk::execute(
            &mut ledger,
            case.source.as_ref(),
            TradeAction::Buy,
            &listed,
            1,
        )
        .unwrap_or_else(|error| panic!("source '{}' trade failed: {error}", case.source.name()));

        assert_eq!(fill.unit_price, price);
        assert_eq!(ledger.cash(), Decimal::from(1000) - price.value());
    }
}

#[test]
fn unreachable_sources_report_unavailable_and_block_trades() {
    let offline = FixtureHttpClient::new().with_failure(
        "yahoo.com",
        papertrade_core::http_client::HttpError::new("connection refused"),
    );
    let sources: Vec<Arc<dyn QuoteSource>> = vec![
        Arc::new(SimulatedSource::unreachable()),
        Arc::new(YahooSource::with_http_client(Arc::new(offline))),
    ];

    for source in sources {
        let err = source.fetch_price(&symbol("AAPL")).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::Unavailable, "source '{}'", source.name());
        assert!(err.retryable());

        let mut ledger = Ledger::new();
        desk::execute(&mut ledger, source.as_ref(), TradeAction::Buy, &symbol("ZZZZ"), 1)
            .expect_err("no price, no trade");
        assert_eq!(ledger, Ledger::new());
    }
}
