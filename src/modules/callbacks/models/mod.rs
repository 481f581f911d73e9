use serde_json::{Map, Value};

/// One inbound webhook delivery reduced to a canonical shape.
///
/// Produced once per delivery and consumed immediately by reconciliation;
/// never persisted.
#[derive(Debug, Clone)]
pub struct NormalizedCallback {
    /// The merchant trade number the delivery refers to
    pub trade_reference: String,
    /// Full decoded payload, for status extraction and audit logging
    pub payload: Map<String, Value>,
    /// Content type the delivery arrived with, empty when absent
    pub received_content_type: String,
}
