// End-to-end properties of the reconciliation state machine over in-memory
// collaborators: exactly one order per trade number no matter how many
// success signals arrive, no orphan orders, and operator-queue behavior
// when the order store is down.

use paybridge::modules::carts::models::{CartLine, CartSnapshot};
use paybridge::modules::carts::repositories::{CartProvider, MemoryCartStore};
use paybridge::modules::gateway::models::GatewayStatus;
use paybridge::modules::orders::repositories::{MemoryOrderStore, OrderStore};
use paybridge::modules::reconciliation::models::{TradeAttempt, TradeStatus};
use paybridge::modules::reconciliation::repositories::{MemoryTradeStore, TradeStore};
use paybridge::modules::reconciliation::services::{ReconcileOutcome, ReconciliationService};
use rust_decimal_macros::dec;
use std::sync::Arc;

struct Harness {
    trades: Arc<MemoryTradeStore>,
    orders: Arc<MemoryOrderStore>,
    carts: Arc<MemoryCartStore>,
    reconciler: ReconciliationService,
}

fn harness() -> Harness {
    let trades = Arc::new(MemoryTradeStore::new());
    let orders = Arc::new(MemoryOrderStore::new());
    let carts = Arc::new(MemoryCartStore::new());
    let reconciler = ReconciliationService::new(
        trades.clone() as Arc<dyn TradeStore>,
        orders.clone() as Arc<dyn OrderStore>,
        carts.clone() as Arc<dyn CartProvider>,
    );
    Harness {
        trades,
        orders,
        carts,
        reconciler,
    }
}

fn cart_lines() -> Vec<CartLine> {
    vec![CartLine {
        product_id: "prod-1".to_string(),
        name: "Trail shoes".to_string(),
        quantity: 1,
        unit_price_usd: dec!(50.00),
    }]
}

/// Seed a pending attempt the way checkout leaves it.
async fn seed_pending(h: &Harness, trade_no: &str) {
    let snapshot = CartSnapshot::new("user-1".to_string(), cart_lines());
    h.carts.stock("user-1", cart_lines()).await;

    let attempt = TradeAttempt::new(
        trade_no.to_string(),
        "user-1".to_string(),
        790000,
        snapshot.descriptor(),
        "https://shop.example/return".to_string(),
        serde_json::to_value(&snapshot).unwrap(),
    )
    .unwrap();
    h.trades.create(&attempt).await.unwrap();
    h.trades
        .mark_pending(trade_no, "PLT-1", "https://pay.example/w/1")
        .await
        .unwrap();
}

#[tokio::test]
async fn duplicate_success_signals_create_exactly_one_order() {
    let h = harness();
    seed_pending(&h, "TXN1000").await;

    let first = h
        .reconciler
        .apply("TXN1000", GatewayStatus::Success, "webhook")
        .await
        .unwrap();
    assert_eq!(first, ReconcileOutcome::OrderCreated);

    // Duplicate callback plus a late poll: both acknowledged, both no-ops.
    let second = h
        .reconciler
        .apply("TXN1000", GatewayStatus::Success, "webhook")
        .await
        .unwrap();
    let third = h
        .reconciler
        .apply("TXN1000", GatewayStatus::Success, "poll")
        .await
        .unwrap();
    assert_eq!(second, ReconcileOutcome::AlreadyReconciled);
    assert_eq!(third, ReconcileOutcome::AlreadyReconciled);

    assert_eq!(h.orders.count().await, 1);
    let order = h.orders.find_by_trade_no("TXN1000").await.unwrap().unwrap();
    assert_eq!(order.merchant_trade_no, "TXN1000");
    assert_eq!(order.total_minor, 790000);

    // Cart cleared exactly once, by the delivery that created the order.
    assert!(h.carts.is_cleared("user-1").await);
    assert_eq!(h.carts.clear_count(), 1);
}

#[tokio::test]
async fn failed_attempt_never_produces_an_order() {
    let h = harness();
    seed_pending(&h, "TXN2000").await;

    let outcome = h
        .reconciler
        .apply("TXN2000", GatewayStatus::Failed, "webhook")
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::MarkedFailed);

    // Repeated queries after the terminal state change nothing.
    for _ in 0..3 {
        let replay = h
            .reconciler
            .apply("TXN2000", GatewayStatus::Failed, "poll")
            .await
            .unwrap();
        assert_eq!(replay, ReconcileOutcome::Ignored);
    }

    assert_eq!(h.orders.count().await, 0);

    // Cart preserved so checkout can be retried.
    assert!(!h.carts.is_cleared("user-1").await);
    assert_eq!(h.carts.clear_count(), 0);

    let attempt = h.trades.find_by_trade_no("TXN2000").await.unwrap().unwrap();
    assert_eq!(attempt.status, TradeStatus::Failed);
}

#[tokio::test]
async fn expiry_signal_finalizes_without_an_order() {
    let h = harness();
    seed_pending(&h, "TXN3000").await;

    let outcome = h
        .reconciler
        .apply("TXN3000", GatewayStatus::Expired, "poll")
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::MarkedExpired);

    let attempt = h.trades.find_by_trade_no("TXN3000").await.unwrap().unwrap();
    assert_eq!(attempt.status, TradeStatus::Expired);
    assert_eq!(h.orders.count().await, 0);
}

#[tokio::test]
async fn success_after_terminal_failure_is_ignored() {
    let h = harness();
    seed_pending(&h, "TXN4000").await;

    h.reconciler
        .apply("TXN4000", GatewayStatus::Failed, "webhook")
        .await
        .unwrap();

    // A stale success signal must not resurrect the attempt.
    let outcome = h
        .reconciler
        .apply("TXN4000", GatewayStatus::Success, "webhook")
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Ignored);
    assert_eq!(h.orders.count().await, 0);
}

#[tokio::test]
async fn pending_signal_changes_nothing() {
    let h = harness();
    seed_pending(&h, "TXN5000").await;

    let outcome = h
        .reconciler
        .apply("TXN5000", GatewayStatus::Pending, "poll")
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::StillPending);

    let attempt = h.trades.find_by_trade_no("TXN5000").await.unwrap().unwrap();
    assert_eq!(attempt.status, TradeStatus::Pending);
}

#[tokio::test]
async fn unknown_trade_reference_is_acknowledged_but_ignored() {
    let h = harness();

    let outcome = h
        .reconciler
        .apply("TXN9999", GatewayStatus::Success, "webhook")
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Ignored);
    assert_eq!(h.orders.count().await, 0);
}

#[tokio::test]
async fn order_store_outage_parks_the_attempt_for_an_operator() {
    let h = harness();
    seed_pending(&h, "TXN6000").await;

    h.orders.set_fail_creates(true);
    let outcome = h
        .reconciler
        .apply("TXN6000", GatewayStatus::Success, "webhook")
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Unresolved);

    // Payment stays settled, order owed, attempt queued for an operator.
    let attempt = h.trades.find_by_trade_no("TXN6000").await.unwrap().unwrap();
    assert_eq!(attempt.status, TradeStatus::Succeeded);
    assert!(attempt.unresolved);
    assert_eq!(h.trades.list_unresolved().await.unwrap().len(), 1);
    assert_eq!(h.orders.count().await, 0);

    // Once the store recovers, a replayed success signal heals the gap.
    h.orders.set_fail_creates(false);
    let healed = h
        .reconciler
        .apply("TXN6000", GatewayStatus::Success, "poll")
        .await
        .unwrap();
    assert_eq!(healed, ReconcileOutcome::OrderCreated);
    assert_eq!(h.orders.count().await, 1);

    let attempt = h.trades.find_by_trade_no("TXN6000").await.unwrap().unwrap();
    assert!(!attempt.unresolved);
    assert!(h.trades.list_unresolved().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_success_signals_race_to_one_order() {
    let h = harness();
    seed_pending(&h, "TXN7000").await;

    let reconciler = Arc::new(h.reconciler);
    let mut handles = Vec::new();
    for _ in 0..8 {
        let reconciler = reconciler.clone();
        handles.push(tokio::spawn(async move {
            reconciler
                .apply("TXN7000", GatewayStatus::Success, "webhook")
                .await
                .unwrap()
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap() == ReconcileOutcome::OrderCreated {
            created += 1;
        }
    }

    assert_eq!(created, 1, "exactly one delivery may create the order");
    assert_eq!(h.orders.count().await, 1);
    assert_eq!(h.carts.clear_count(), 1);
}
