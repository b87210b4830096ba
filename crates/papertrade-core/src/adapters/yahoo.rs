//! Live quote source backed by Yahoo Finance.
//!
//! Prices and history come from the v8 chart endpoint and symbol resolution
//! from the v1 search endpoint. Neither needs the cookie and crumb handshake
//! that the v7 quote endpoint requires.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::source::{QuoteSource, SourceError};
use crate::{
    AssetClass, HistoryPeriod, Instrument, Price, PriceHistory, PricePoint, Quote, Symbol,
    TradingDay,
};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
const REFERER: &str = "https://finance.yahoo.com/";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const TIMEOUT_MS: u64 = 10_000;
const SEARCH_LIMIT: usize = 5;

/// Yahoo reports binary floats; prices are rounded to this many places.
const PRICE_DECIMALS: u32 = 4;

/// Quote source that calls Yahoo Finance over HTTP.
#[derive(Clone)]
pub struct YahooSource {
    http_client: Arc<dyn HttpClient>,
}

impl Default for YahooSource {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooSource {
    pub fn new() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    fn get(&self, endpoint: &str) -> Result<HttpResponse, SourceError> {
        let request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_header("user-agent", BROWSER_USER_AGENT)
            .with_timeout_ms(TIMEOUT_MS);

        self.http_client.execute(request).map_err(|error| {
            debug!(endpoint, reason = error.message(), "yahoo transport error");
            SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
        })
    }

    /// Daily chart for `symbol`; `None` when Yahoo does not know the symbol.
    fn chart(&self, symbol: &Symbol, window: &str) -> Result<Option<ChartResult>, SourceError> {
        let endpoint = format!(
            "{CHART_URL}/{}?{window}&interval=1d",
            urlencoding::encode(symbol.as_str())
        );
        let response = self.get(&endpoint)?;
        if response.status == 404 {
            return Ok(None);
        }
        ensure_success(&response)?;

        let chart: ChartResponse = parse(&response.body)?;
        if let Some(error) = chart.chart.error {
            if error.code == "Not Found" {
                return Ok(None);
            }
            return Err(SourceError::unavailable(format!(
                "yahoo chart error: {}",
                error.description.unwrap_or(error.code)
            )));
        }

        Ok(chart.chart.result.and_then(|results| results.into_iter().next()))
    }
}

impl QuoteSource for YahooSource {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn fetch_price(&self, symbol: &Symbol) -> Result<Quote, SourceError> {
        let result = self
            .chart(symbol, "range=1d")?
            .ok_or_else(|| SourceError::symbol_not_found(symbol.as_str()))?;

        let price = result
            .meta
            .regular_market_price
            .and_then(to_price)
            .ok_or_else(|| {
                SourceError::unavailable(format!("yahoo has no current price for {symbol}"))
            })?;

        Ok(Quote {
            symbol: symbol.clone(),
            price,
        })
    }

    fn fetch_history(
        &self,
        symbol: &Symbol,
        period: HistoryPeriod,
    ) -> Result<PriceHistory, SourceError> {
        let now = OffsetDateTime::now_utc();
        let start = now
            .checked_sub(Duration::days(i64::from(period.calendar_days())))
            .map_or(0, OffsetDateTime::unix_timestamp);
        let window = format!("period1={start}&period2={}", now.unix_timestamp());

        let points = self
            .chart(symbol, &window)?
            .map(|result| daily_points(&result))
            .unwrap_or_default();
        Ok(PriceHistory::new(symbol.clone(), period, points))
    }

    fn resolve_symbol(&self, query: &str) -> Result<Instrument, SourceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SourceError::invalid_request("lookup query must not be empty"));
        }

        let endpoint = format!(
            "{SEARCH_URL}?q={}&quotesCount={SEARCH_LIMIT}&newsCount=0",
            urlencoding::encode(query)
        );
        let response = self.get(&endpoint)?;
        ensure_success(&response)?;

        let search: SearchResponse = parse(&response.body)?;
        search
            .quotes
            .into_iter()
            .find_map(SearchQuote::into_instrument)
            .ok_or_else(|| SourceError::symbol_not_found(query))
    }
}

fn ensure_success(response: &HttpResponse) -> Result<(), SourceError> {
    if response.is_success() {
        return Ok(());
    }
    Err(SourceError::unavailable(format!(
        "yahoo returned status {}",
        response.status
    )))
}

fn parse<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, SourceError> {
    serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo response: {e}")))
}

fn to_price(value: Decimal) -> Option<Price> {
    Price::new(value.round_dp(PRICE_DECIMALS)).ok()
}

/// One point per exchange-local trading day. Bars without a close are
/// skipped and a later bar for the same day replaces the earlier one.
fn daily_points(result: &ChartResult) -> Vec<PricePoint> {
    let closes = result
        .indicators
        .quote
        .first()
        .map(|quote| quote.close.as_slice())
        .unwrap_or_default();

    let mut points: Vec<PricePoint> = Vec::with_capacity(result.timestamp.len());
    for (timestamp, close) in result.timestamp.iter().zip(closes.iter().copied()) {
        let Some(close) = close.and_then(to_price) else {
            continue;
        };
        let Some(date) = timestamp
            .checked_add(result.meta.gmtoffset)
            .and_then(|local| OffsetDateTime::from_unix_timestamp(local).ok())
            .map(|local| TradingDay::from_date(local.date()))
        else {
            continue;
        };

        let point = PricePoint { date, close };
        match points.last().map(|last| last.date) {
            Some(last_date) if last_date > date => {}
            Some(last_date) if last_date == date => {
                points.pop();
                points.push(point);
            }
            _ => points.push(point),
        }
    }
    points
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<Decimal>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<Decimal>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: String,
    #[serde(default)]
    shortname: Option<String>,
    #[serde(default)]
    longname: Option<String>,
    #[serde(rename = "exchDisp", default)]
    exchange: Option<String>,
    #[serde(rename = "quoteType", default)]
    quote_type: Option<String>,
}

impl SearchQuote {
    fn into_instrument(self) -> Option<Instrument> {
        let symbol = Symbol::parse(&self.symbol).ok()?;
        let asset_class = match self.quote_type.as_deref() {
            Some("EQUITY") => AssetClass::Equity,
            Some("ETF") => AssetClass::Etf,
            Some("MUTUALFUND") => AssetClass::Fund,
            Some("INDEX") => AssetClass::Index,
            Some("CRYPTOCURRENCY") => AssetClass::Crypto,
            Some("CURRENCY") => AssetClass::Forex,
            _ => AssetClass::Other,
        };
        let name = self
            .longname
            .or(self.shortname)
            .unwrap_or_else(|| self.symbol.clone());

        Some(Instrument::new(symbol, name, self.exchange, asset_class))
    }
}
