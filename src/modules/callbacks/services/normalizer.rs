use crate::core::{AppError, Result};
use crate::modules::callbacks::models::NormalizedCallback;
use serde_json::{Map, Value};

/// Trade-reference fields the processor has used across webhook revisions,
/// in priority order. First present wins; nothing is ever guessed.
const TRADE_REFERENCE_FIELDS: [&str; 4] =
    ["merchantTradeNo", "merchant_trade_no", "trxId", "orderId"];

/// Normalize an inbound webhook delivery into one canonical shape.
///
/// Dispatch is by content type: JSON and text/plain bodies are JSON-parsed,
/// form-urlencoded bodies are key-value parsed. A missing content type, an
/// unknown one, or a parse failure falls back to a best-effort JSON parse
/// before the delivery is rejected as malformed.
pub fn normalize(raw_body: &[u8], content_type: &str) -> Result<NormalizedCallback> {
    let base_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    let payload = match base_type.as_str() {
        "application/json" | "text/plain" => parse_json(raw_body),
        "application/x-www-form-urlencoded" => parse_form(raw_body),
        _ => Err(AppError::malformed_callback(format!(
            "unhandled content type '{}'",
            base_type
        ))),
    }
    // Last resort for absent/unknown content types and mislabeled bodies.
    .or_else(|_| parse_json(raw_body))?;

    let trade_reference = extract_trade_reference(&payload).ok_or_else(|| {
        AppError::malformed_callback("no trade reference field present in callback")
    })?;

    Ok(NormalizedCallback {
        trade_reference,
        payload,
        received_content_type: content_type.to_string(),
    })
}

fn parse_json(raw_body: &[u8]) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_slice(raw_body)
        .map_err(|e| AppError::malformed_callback(format!("body is not valid JSON: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::malformed_callback(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn parse_form(raw_body: &[u8]) -> Result<Map<String, Value>> {
    // A body without a single key=value separator is not form data, no
    // matter what the header claims; let the JSON fallback have it.
    if !raw_body.contains(&b'=') {
        return Err(AppError::malformed_callback("body is not form data"));
    }

    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(raw_body)
        .map_err(|e| AppError::malformed_callback(format!("body is not valid form data: {}", e)))?;

    if pairs.is_empty() {
        return Err(AppError::malformed_callback("form body is empty"));
    }

    Ok(pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect())
}

fn extract_trade_reference(payload: &Map<String, Value>) -> Option<String> {
    for field in TRADE_REFERENCE_FIELDS {
        match payload.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            // Some deliveries carry numeric order ids
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
