use crate::core::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Lifecycle of a checkout attempt.
///
/// `Created -> Pending -> {Succeeded | Failed | Expired}`. The last three
/// are terminal; nothing transitions out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(16)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    /// Attempt persisted, nothing sent to the processor yet
    Created,
    /// Processor accepted the create call; awaiting callback or poll
    Pending,
    /// Payment settled; order materialization owed
    Succeeded,
    /// Processor reported failure or cancellation
    Failed,
    /// Payment window lapsed without settlement
    Expired,
}

impl TradeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TradeStatus::Succeeded | TradeStatus::Failed | TradeStatus::Expired
        )
    }

    /// Legal forward transitions
    pub fn can_transition_to(&self, next: TradeStatus) -> bool {
        matches!(
            (self, next),
            (TradeStatus::Created, TradeStatus::Pending)
                | (TradeStatus::Pending, TradeStatus::Succeeded)
                | (TradeStatus::Pending, TradeStatus::Failed)
                | (TradeStatus::Pending, TradeStatus::Expired)
        )
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Created => write!(f, "created"),
            TradeStatus::Pending => write!(f, "pending"),
            TradeStatus::Succeeded => write!(f, "succeeded"),
            TradeStatus::Failed => write!(f, "failed"),
            TradeStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for TradeStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "created" => Ok(TradeStatus::Created),
            "pending" => Ok(TradeStatus::Pending),
            "succeeded" => Ok(TradeStatus::Succeeded),
            "failed" => Ok(TradeStatus::Failed),
            "expired" => Ok(TradeStatus::Expired),
            _ => Err(format!("Invalid trade status: {}", s)),
        }
    }
}

/// One checkout attempt against the processor.
///
/// Owned exclusively by the reconciliation machine until terminal. Its
/// existence does not imply an order exists: an order appears only when
/// the attempt reaches `Succeeded` and the compare-and-create wins.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeAttempt {
    /// Caller-generated, globally unique trade reference
    pub merchant_trade_no: String,

    pub user_id: String,

    /// Charge amount in whole rupiah
    pub amount_minor: i64,

    /// Short product summary shown on the processor's payment page
    pub descriptor: String,

    /// Where the processor sends the customer after paying
    pub redirect_url: String,

    pub status: TradeStatus,

    /// Processor-side trade number, known once the create call succeeds
    pub platform_trade_no: Option<String>,

    /// Hosted payment page for this attempt
    pub pay_url: Option<String>,

    /// Cart contents staged at checkout time, materialized into the order
    pub cart_snapshot: serde_json::Value,

    /// Set when payment succeeded but the order could not be created;
    /// such attempts sit in the operator queue until resolved
    pub unresolved: bool,

    #[serde(skip_deserializing)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_deserializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TradeAttempt {
    /// Create a new attempt in `Created` state.
    pub fn new(
        merchant_trade_no: String,
        user_id: String,
        amount_minor: i64,
        descriptor: String,
        redirect_url: String,
        cart_snapshot: serde_json::Value,
    ) -> Result<Self> {
        if merchant_trade_no.trim().is_empty() {
            return Err(AppError::validation("Merchant trade number cannot be empty"));
        }

        if user_id.trim().is_empty() {
            return Err(AppError::validation("User ID cannot be empty"));
        }

        if amount_minor <= 0 {
            return Err(AppError::validation("Charge amount must be positive"));
        }

        Ok(Self {
            merchant_trade_no,
            user_id,
            amount_minor,
            descriptor,
            redirect_url,
            status: TradeStatus::Created,
            platform_trade_no: None,
            pay_url: None,
            cart_snapshot,
            unresolved: false,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        })
    }
}
