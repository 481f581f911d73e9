use crate::core::Result;
use crate::modules::carts::repositories::CartProvider;
use crate::modules::gateway::models::GatewayStatus;
use crate::modules::orders::models::OrderRecord;
use crate::modules::orders::repositories::{OrderOutcome, OrderStore};
use crate::modules::reconciliation::models::{TradeAttempt, TradeStatus};
use crate::modules::reconciliation::repositories::TradeStore;
use std::sync::Arc;
use tracing::{error, info, warn};

/// What applying one gateway signal did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Payment succeeded and this signal materialized the order
    OrderCreated,
    /// Payment succeeded earlier; the order already existed
    AlreadyReconciled,
    /// Attempt marked failed; cart preserved for retry
    MarkedFailed,
    /// Attempt marked expired; cart preserved for retry
    MarkedExpired,
    /// Signal reported a still-pending payment; nothing to do
    StillPending,
    /// Signal ignored: unknown reference or terminal-state replay
    Ignored,
    /// Payment succeeded but the order store failed; queued for an operator
    Unresolved,
}

/// The reconciliation state machine.
///
/// Consumes gateway status signals, from webhook deliveries and from
/// polls, and owns every trade attempt transition. The at-most-one-order
/// guarantee rides entirely on the order store's compare-and-create; this
/// service may race itself across deliveries and processes without ever
/// producing a second order for the same trade number.
pub struct ReconciliationService {
    trades: Arc<dyn TradeStore>,
    orders: Arc<dyn OrderStore>,
    carts: Arc<dyn CartProvider>,
}

impl ReconciliationService {
    pub fn new(
        trades: Arc<dyn TradeStore>,
        orders: Arc<dyn OrderStore>,
        carts: Arc<dyn CartProvider>,
    ) -> Self {
        Self {
            trades,
            orders,
            carts,
        }
    }

    /// Apply one gateway signal to the attempt it references.
    ///
    /// Idempotent: duplicate signals after a terminal state are no-ops,
    /// logged and acknowledged rather than errored, so the processor's
    /// webhook retries are never amplified. `origin` tags the log trail
    /// with where the signal came from (webhook or poll).
    pub async fn apply(
        &self,
        merchant_trade_no: &str,
        status: GatewayStatus,
        origin: &str,
    ) -> Result<ReconcileOutcome> {
        let Some(attempt) = self.trades.find_by_trade_no(merchant_trade_no).await? else {
            warn!(
                merchant_trade_no = %merchant_trade_no,
                origin = %origin,
                "Signal for unknown trade reference, ignoring"
            );
            return Ok(ReconcileOutcome::Ignored);
        };

        match status {
            GatewayStatus::Pending => Ok(ReconcileOutcome::StillPending),
            GatewayStatus::Success => self.reconcile_success(attempt, origin).await,
            GatewayStatus::Failed => {
                self.finalize(attempt, TradeStatus::Failed, origin, ReconcileOutcome::MarkedFailed)
                    .await
            }
            GatewayStatus::Expired => {
                self.finalize(
                    attempt,
                    TradeStatus::Expired,
                    origin,
                    ReconcileOutcome::MarkedExpired,
                )
                .await
            }
        }
    }

    /// Drive a success signal to its terminal outcome.
    ///
    /// The status flip and the order insert are two separate steps, so a
    /// crash can leave a Succeeded attempt without an order. Success
    /// signals therefore re-run materialization even when the attempt is
    /// already Succeeded: the compare-and-create makes the replay a no-op
    /// when the order exists and heals the gap when it does not.
    async fn reconcile_success(
        &self,
        attempt: TradeAttempt,
        origin: &str,
    ) -> Result<ReconcileOutcome> {
        match attempt.status {
            TradeStatus::Pending | TradeStatus::Succeeded => {}
            other => {
                info!(
                    merchant_trade_no = %attempt.merchant_trade_no,
                    status = %other,
                    origin = %origin,
                    "Success signal for non-pending attempt, ignoring"
                );
                return Ok(ReconcileOutcome::Ignored);
            }
        }

        let newly_succeeded = self
            .trades
            .transition(
                &attempt.merchant_trade_no,
                TradeStatus::Pending,
                TradeStatus::Succeeded,
            )
            .await?;

        let order = OrderRecord::from_attempt(&attempt)?;

        match self.orders.create_if_absent(order).await {
            Ok(OrderOutcome::Created(order)) => {
                if let Err(e) = self.carts.clear(&attempt.user_id).await {
                    // The order exists; a lingering cart is an annoyance,
                    // not a correctness problem.
                    warn!(
                        merchant_trade_no = %attempt.merchant_trade_no,
                        user_id = %attempt.user_id,
                        error = %e,
                        "Order created but cart clear failed"
                    );
                }

                if attempt.unresolved {
                    self.trades
                        .clear_unresolved(&attempt.merchant_trade_no)
                        .await?;
                }

                info!(
                    merchant_trade_no = %attempt.merchant_trade_no,
                    order_id = %order.id,
                    origin = %origin,
                    "Attempt reconciled, order materialized"
                );
                Ok(ReconcileOutcome::OrderCreated)
            }
            Ok(OrderOutcome::Conflict(existing)) => {
                info!(
                    merchant_trade_no = %attempt.merchant_trade_no,
                    order_id = %existing.id,
                    origin = %origin,
                    "Duplicate success signal, order already materialized"
                );
                Ok(ReconcileOutcome::AlreadyReconciled)
            }
            Err(e) => {
                // Payment is settled; dropping the signal would strand the
                // money. Park the attempt for an operator instead, and do
                // not fail the delivery: re-triggering payment is the one
                // thing that must never happen here.
                error!(
                    merchant_trade_no = %attempt.merchant_trade_no,
                    newly_succeeded = newly_succeeded,
                    origin = %origin,
                    error = %e,
                    "Payment succeeded but order creation failed, queueing for operator"
                );
                self.trades
                    .mark_unresolved(&attempt.merchant_trade_no)
                    .await?;
                Ok(ReconcileOutcome::Unresolved)
            }
        }
    }

    /// Apply a failure or expiry signal. The cart is left untouched so the
    /// user can retry checkout.
    async fn finalize(
        &self,
        attempt: TradeAttempt,
        terminal: TradeStatus,
        origin: &str,
        outcome: ReconcileOutcome,
    ) -> Result<ReconcileOutcome> {
        let transitioned = self
            .trades
            .transition(&attempt.merchant_trade_no, TradeStatus::Pending, terminal)
            .await?;

        if !transitioned {
            info!(
                merchant_trade_no = %attempt.merchant_trade_no,
                status = %attempt.status,
                signal = %terminal,
                origin = %origin,
                "Terminal signal for non-pending attempt, ignoring"
            );
            return Ok(ReconcileOutcome::Ignored);
        }

        info!(
            merchant_trade_no = %attempt.merchant_trade_no,
            status = %terminal,
            origin = %origin,
            "Attempt finalized without order"
        );
        Ok(outcome)
    }
}
