//! Behavior-driven tests for the portfolio ledger
//!
//! These tests verify how cash and holdings move through buys and sells,
//! and that refused trades leave no trace.

use papertrade_core::{
    Ledger, Snapshot, Symbol, Trade, TradeAction, TradeRejection, STARTING_CASH,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn dollars(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Cash plus every holding valued at its cost-basis price in `prices`.
fn marked_value(ledger: &Ledger, prices: &BTreeMap<Symbol, Decimal>) -> Decimal {
    ledger
        .holdings()
        .iter()
        .map(|(symbol, count)| prices[symbol] * Decimal::from(*count))
        .sum::<Decimal>()
        + ledger.cash()
}

// =============================================================================
// Ledger: Starting State
// =============================================================================

#[test]
fn when_user_starts_a_new_game_they_have_one_thousand_dollars_and_nothing_else() {
    // Given/When: A brand new ledger
    let ledger = Ledger::new();

    // Then: It holds the starting cash only
    assert_eq!(ledger.cash(), STARTING_CASH);
    assert_eq!(ledger.cash(), Decimal::from(1000));
    assert!(ledger.holdings().is_empty());
    assert!(ledger.lookups().is_empty());
}

// =============================================================================
// Ledger: Buying and Selling
// =============================================================================

#[test]
fn when_user_plays_a_full_round_cash_and_holdings_track_every_trade() {
    // Given: A fresh ledger
    let mut ledger = Ledger::new();
    let aapl = symbol("AAPL");
    let msft = symbol("MSFT");

    // When: User buys, buys again, then sells part of a position
    ledger.buy(&aapl, 3, dollars(10_000)).expect("buy AAPL");
    ledger.buy(&msft, 2, dollars(25_050)).expect("buy MSFT");
    let fill = ledger.sell(&aapl, 1, dollars(11_025)).expect("sell AAPL");

    // Then: Every step is reflected exactly
    assert_eq!(fill.amount, dollars(11_025));
    assert_eq!(fill.shares_after, 2);
    assert_eq!(ledger.holding(&aapl), 2);
    assert_eq!(ledger.holding(&msft), 2);
    assert_eq!(
        ledger.cash(),
        Decimal::from(1000) - dollars(30_000) - dollars(50_100) + dollars(11_025)
    );
}

#[test]
fn when_user_sells_their_last_share_the_position_disappears() {
    // Given: A ledger holding two shares
    let mut ledger = Ledger::new();
    let tsla = symbol("TSLA");
    ledger.buy(&tsla, 2, Decimal::from(50)).expect("buy");

    // When: User sells both
    let fill = ledger.sell(&tsla, 2, Decimal::from(60)).expect("sell");

    // Then: No zero-share entry remains
    assert_eq!(fill.shares_after, 0);
    assert!(!ledger.holdings().contains_key(&tsla));
    assert_eq!(ledger.cash(), Decimal::from(1020));
}

#[test]
fn when_user_spends_exactly_all_cash_the_buy_succeeds() {
    // Given: A fresh ledger
    let mut ledger = Ledger::new();

    // When: User buys shares costing exactly the balance
    ledger
        .buy(&symbol("SPY"), 4, Decimal::from(250))
        .expect("exact spend should fill");

    // Then: Cash reaches zero without going negative
    assert_eq!(ledger.cash(), Decimal::ZERO);
}

#[test]
fn when_prices_stay_fixed_trades_conserve_total_value() {
    // Given: A ledger and fixed prices
    let mut ledger = Ledger::new();
    let prices: BTreeMap<Symbol, Decimal> = [
        (symbol("AAPL"), dollars(9_233)),
        (symbol("BRK.B"), dollars(41_017)),
        (symbol("^GSPC"), dollars(1_001)),
    ]
    .into_iter()
    .collect();
    let start = marked_value(&ledger, &prices);

    // When: A mixed sequence of trades runs, including refused ones
    let script = [
        (TradeAction::Buy, "AAPL", 3),
        (TradeAction::Buy, "BRK.B", 1),
        (TradeAction::Buy, "BRK.B", 5),
        (TradeAction::Sell, "AAPL", 1),
        (TradeAction::Buy, "^GSPC", 7),
        (TradeAction::Sell, "^GSPC", 9),
        (TradeAction::Sell, "BRK.B", 1),
    ];
    for (action, raw, quantity) in script {
        let symbol = symbol(raw);
        let price = prices[&symbol];
        let _ = match action {
            TradeAction::Buy => ledger.buy(&symbol, quantity, price),
            TradeAction::Sell => ledger.sell(&symbol, quantity, price),
        };

        // Then: Total value is unchanged after every step
        assert_eq!(marked_value(&ledger, &prices), start);
        assert!(ledger.cash() >= Decimal::ZERO);
        assert!(ledger.holdings().values().all(|count| *count > 0));
    }
}

// =============================================================================
// Ledger: Refused Trades
// =============================================================================

#[test]
fn when_user_cannot_afford_a_buy_nothing_changes() {
    // Given: A ledger with some activity
    let mut ledger = Ledger::new();
    ledger.buy(&symbol("AAPL"), 1, Decimal::from(100)).expect("buy");
    ledger.record_lookup("apple");
    let before = ledger.clone();

    // When: User tries to buy more than they can afford
    let err = ledger
        .buy(&symbol("AMZN"), 10, Decimal::from(1000))
        .expect_err("must be refused");

    // Then: The refusal names both amounts and the ledger is untouched
    assert_eq!(
        err,
        TradeRejection::InsufficientFunds {
            required: Decimal::from(10_000),
            available: Decimal::from(900),
        }
    );
    assert_eq!(ledger, before);
}

#[test]
fn when_user_sells_more_than_they_hold_nothing_changes() {
    // Given: A ledger holding three shares
    let mut ledger = Ledger::new();
    let aapl = symbol("AAPL");
    ledger.buy(&aapl, 3, Decimal::from(10)).expect("buy");
    let before = ledger.clone();

    // When: User sells five
    let err = ledger
        .sell(&aapl, 5, Decimal::from(10))
        .expect_err("must be refused");

    // Then: The ledger is untouched
    assert!(matches!(
        err,
        TradeRejection::InsufficientShares {
            requested: 5,
            held: 3,
            ..
        }
    ));
    assert_eq!(ledger, before);
}

#[test]
fn when_user_sells_a_symbol_they_never_bought_it_is_refused() {
    let mut ledger = Ledger::new();

    let err = ledger
        .sell(&symbol("QQQ"), 1, Decimal::from(10))
        .expect_err("must be refused");

    assert_eq!(err.code(), "trade.insufficient_shares");
    assert_eq!(ledger, Ledger::new());
}

#[test]
fn when_quantity_or_price_is_not_positive_the_trade_is_refused() {
    let mut ledger = Ledger::new();
    let aapl = symbol("AAPL");

    assert_eq!(
        ledger.buy(&aapl, 0, Decimal::from(10)),
        Err(TradeRejection::InvalidQuantity)
    );
    assert!(matches!(
        ledger.buy(&aapl, 1, Decimal::ZERO),
        Err(TradeRejection::InvalidPrice { .. })
    ));
    assert!(matches!(
        ledger.sell(&aapl, 1, Decimal::from(-5)),
        Err(TradeRejection::InvalidPrice { .. })
    ));
    assert_eq!(ledger, Ledger::new());
}

// =============================================================================
// Ledger: Trades, Lookups and Snapshots
// =============================================================================

#[test]
fn when_a_validated_trade_is_applied_it_matches_the_direct_call() {
    // Given: Two identical ledgers
    let mut via_trade = Ledger::new();
    let mut direct = Ledger::new();
    let trade = Trade::new(TradeAction::Buy, symbol("GOOGL"), 2, dollars(14_010))
        .expect("valid trade");

    // When: One applies a Trade, the other calls buy
    via_trade.apply(&trade).expect("apply");
    direct
        .buy(&symbol("GOOGL"), 2, dollars(14_010))
        .expect("buy");

    // Then: Both end in the same state
    assert_eq!(via_trade, direct);
}

#[test]
fn when_user_looks_up_companies_queries_are_kept_in_order_normalized() {
    let mut ledger = Ledger::new();

    ledger.record_lookup("  Apple Inc ");
    ledger.record_lookup("MSFT");
    ledger.record_lookup("apple inc");

    assert_eq!(ledger.lookups(), ["apple inc", "msft", "apple inc"]);
}

#[test]
fn when_a_snapshot_is_restored_the_ledger_matches_it_exactly() {
    // Given: A snapshot with holdings and lookups
    let holdings: BTreeMap<Symbol, u64> = [(symbol("AAPL"), 3), (symbol("EURUSD=X"), 12)]
        .into_iter()
        .collect();
    let snapshot = Snapshot::new(
        dollars(74_025),
        holdings,
        vec!["apple".to_owned(), "euro".to_owned()],
    )
    .expect("valid snapshot");

    // When: A ledger with other state restores it
    let mut ledger = Ledger::new();
    ledger.buy(&symbol("SPY"), 1, Decimal::from(1)).expect("buy");
    ledger.restore(snapshot.clone());

    // Then: The ledger projects back to the same snapshot
    assert_eq!(ledger.snapshot(), snapshot);
    assert_eq!(ledger.cash(), dollars(74_025));
    assert_eq!(ledger.holding(&symbol("SPY")), 0);
}

#[test]
fn when_a_snapshot_breaks_ledger_rules_it_cannot_be_built() {
    assert!(Snapshot::new(Decimal::from(-1), BTreeMap::new(), Vec::new()).is_err());

    let zero_holding: BTreeMap<Symbol, u64> = [(symbol("AAPL"), 0)].into_iter().collect();
    assert!(Snapshot::new(Decimal::from(10), zero_holding, Vec::new()).is_err());
}
