use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Processor-reported payment state, reduced to the four outcomes the
/// reconciliation machine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayStatus {
    Pending,
    Success,
    Failed,
    Expired,
}

impl GatewayStatus {
    /// Map a processor status code to an outcome.
    ///
    /// Unknown codes are treated as still-pending rather than failed, so a
    /// new processor code never terminates an attempt by accident.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" | "PAID" | "SETTLED" | "CAPTURE" | "00" => GatewayStatus::Success,
            "FAILED" | "FAILURE" | "CANCELLED" | "CANCEL" | "DENY" => GatewayStatus::Failed,
            "EXPIRED" | "EXPIRE" | "TIMEOUT" => GatewayStatus::Expired,
            _ => GatewayStatus::Pending,
        }
    }

    /// Extract the payment status reported by a callback payload.
    ///
    /// The processor has used `status`, `transactionStatus`, and
    /// `transaction_status` across webhook revisions; first present wins.
    /// A payload with no status field at all reads as pending.
    pub fn from_callback(payload: &Map<String, Value>) -> Self {
        for field in ["status", "transactionStatus", "transaction_status"] {
            if let Some(value) = payload.get(field) {
                if let Some(code) = value.as_str() {
                    return Self::from_code(code);
                }
            }
        }
        GatewayStatus::Pending
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayStatus::Pending => write!(f, "pending"),
            GatewayStatus::Success => write!(f, "success"),
            GatewayStatus::Failed => write!(f, "failed"),
            GatewayStatus::Expired => write!(f, "expired"),
        }
    }
}
