use crate::core::{AppError, Result};
use crate::modules::carts::models::CartSnapshot;
use crate::modules::reconciliation::models::TradeAttempt;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A materialized commerce order.
///
/// Exists only as the terminal side-effect of a succeeded trade attempt.
/// `merchant_trade_no` is the unique business key: the order store's
/// uniqueness guarantee on it is what makes reconciliation idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderRecord {
    pub id: String,
    pub merchant_trade_no: String,
    pub user_id: String,
    /// Cart lines as paid for, from the attempt's staged snapshot
    pub lines: serde_json::Value,
    pub total_usd: Decimal,
    /// Settled amount in whole rupiah
    pub total_minor: i64,
    #[serde(skip_deserializing)]
    pub created_at: Option<DateTime<Utc>>,
}

impl OrderRecord {
    /// Build the order payload from a succeeded attempt's staged snapshot.
    pub fn from_attempt(attempt: &TradeAttempt) -> Result<Self> {
        let snapshot: CartSnapshot = serde_json::from_value(attempt.cart_snapshot.clone())
            .map_err(|e| {
                AppError::internal(format!(
                    "trade attempt '{}' has an unreadable cart snapshot: {}",
                    attempt.merchant_trade_no, e
                ))
            })?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            merchant_trade_no: attempt.merchant_trade_no.clone(),
            user_id: attempt.user_id.clone(),
            lines: serde_json::to_value(&snapshot.lines)?,
            total_usd: snapshot.subtotal_usd,
            total_minor: attempt.amount_minor,
            created_at: Some(Utc::now()),
        })
    }
}
