use super::status::GatewayStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A fully signed outbound request, ready to dispatch.
///
/// Immutable once constructed and never persisted; the signature covers
/// exactly the `body` bytes carried here, so the body must be transmitted
/// byte-for-byte as-is.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
    pub timestamp: String,
    pub signature: String,
    pub request_id: String,
    pub partner_id: String,
}

/// Body of `POST /payment/{version}/cc/create`.
///
/// Field order is the serialization order; the signature is computed over
/// these exact bytes, so the declaration order must not be rearranged
/// independently of what the processor reconstructs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub partner_id: String,
    pub merchant_trade_no: String,
    pub request_id: String,
    /// Amount in whole rupiah (the IDR minor unit)
    pub amount: i64,
    pub currency: String,
    pub product_descriptor: String,
    pub redirect_url: String,
}

/// Body of `POST /payment/{version}/cc/query`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPaymentRequest {
    pub partner_id: String,
    pub merchant_trade_no: String,
    pub request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentActions {
    pub pay_url: String,
}

/// Processor response to a create call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub status: String,
    pub platform_trade_no: String,
    pub payment_actions: PaymentActions,
    #[serde(default)]
    pub expired_time: Option<DateTime<Utc>>,
}

/// Processor response to a query call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPaymentResponse {
    pub status: String,
    #[serde(default)]
    pub platform_trade_no: Option<String>,
}

/// Typed outcome of a create call, as consumed by checkout.
#[derive(Debug, Clone)]
pub struct PaymentCreated {
    pub platform_trade_no: String,
    pub status: GatewayStatus,
    pub pay_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Typed outcome of a query call, as consumed by reconciliation.
#[derive(Debug, Clone)]
pub struct PaymentQuery {
    pub status: GatewayStatus,
    pub raw: Value,
}
