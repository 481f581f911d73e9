use crate::core::{AppError, Result};
use crate::modules::carts::repositories::CartProvider;
use crate::modules::gateway::services::clock;
use crate::modules::gateway::services::PaymentProcessor;
use crate::modules::rates::services::RateCache;
use crate::modules::reconciliation::models::TradeAttempt;
use crate::modules::reconciliation::repositories::TradeStore;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use tracing::info;

/// What checkout hands back to the surrounding application
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub merchant_trade_no: String,
    /// Hosted payment page to redirect the customer to
    pub pay_url: String,
    /// Charge amount in whole rupiah
    pub amount_minor: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Pay-then-order checkout orchestration.
///
/// Snapshot the cart, convert the total, persist the attempt, then ask the
/// processor for a payment page. No order exists at any point on this
/// path: orders are materialized exclusively by reconciliation once the
/// processor confirms settlement.
pub struct CheckoutService {
    trades: Arc<dyn TradeStore>,
    carts: Arc<dyn CartProvider>,
    processor: Arc<dyn PaymentProcessor>,
    rates: Arc<RateCache>,
}

impl CheckoutService {
    pub fn new(
        trades: Arc<dyn TradeStore>,
        carts: Arc<dyn CartProvider>,
        processor: Arc<dyn PaymentProcessor>,
        rates: Arc<RateCache>,
    ) -> Self {
        Self {
            trades,
            carts,
            processor,
            rates,
        }
    }

    /// Start a checkout for the user's current cart.
    ///
    /// On gateway rejection or transport failure the error propagates to
    /// the caller, the attempt stays in `Created`, and the cart is
    /// untouched; the user can simply retry.
    pub async fn checkout(&self, user_id: &str, redirect_url: &str) -> Result<CheckoutOutcome> {
        let snapshot = self.carts.snapshot(user_id).await?;
        if snapshot.is_empty() {
            return Err(AppError::validation("Cart is empty"));
        }

        let amount_idr = self.rates.convert(snapshot.subtotal_usd, true).await;
        let amount_minor = amount_idr.to_i64().ok_or_else(|| {
            AppError::internal(format!("converted amount {} out of range", amount_idr))
        })?;

        let merchant_trade_no = new_trade_number();
        let descriptor = snapshot.descriptor();

        let attempt = TradeAttempt::new(
            merchant_trade_no.clone(),
            user_id.to_string(),
            amount_minor,
            descriptor,
            redirect_url.to_string(),
            serde_json::to_value(&snapshot)?,
        )?;

        self.trades.create(&attempt).await?;

        info!(
            merchant_trade_no = %merchant_trade_no,
            user_id = %user_id,
            subtotal_usd = %snapshot.subtotal_usd,
            amount_minor = amount_minor,
            "Checkout started"
        );

        let created = self.processor.create_payment(&attempt).await?;

        self.trades
            .mark_pending(
                &merchant_trade_no,
                &created.platform_trade_no,
                &created.pay_url,
            )
            .await?;

        Ok(CheckoutOutcome {
            merchant_trade_no,
            pay_url: created.pay_url,
            amount_minor,
            expires_at: created.expires_at,
        })
    }
}

/// Caller-generated trade reference.
///
/// The clock's request id alone is only millisecond-precise, so a uuid
/// suffix supplies the uniqueness the trade number must guarantee.
fn new_trade_number() -> String {
    let entropy = uuid::Uuid::new_v4().simple().to_string();
    format!("TRD{}{}", clock::request_id(), &entropy[..8])
}
