// Callback normalization: every content type the processor has shipped
// must reduce to the same canonical shape, and nothing is ever guessed
// when the trade reference is missing.

use paybridge::core::AppError;
use paybridge::modules::callbacks::services::normalize;

#[test]
fn json_form_and_bare_bodies_extract_the_same_reference() {
    let json_body = br#"{"merchantTradeNo": "TXN1000", "status": "SUCCESS"}"#;
    let form_body = b"merchantTradeNo=TXN1000&status=SUCCESS";
    let bare_body = br#"{"merchantTradeNo": "TXN1000", "status": "SUCCESS"}"#;

    let from_json = normalize(json_body, "application/json").unwrap();
    let from_form = normalize(form_body, "application/x-www-form-urlencoded").unwrap();
    let from_bare = normalize(bare_body, "").unwrap();

    assert_eq!(from_json.trade_reference, "TXN1000");
    assert_eq!(from_form.trade_reference, "TXN1000");
    assert_eq!(from_bare.trade_reference, "TXN1000");
}

#[test]
fn text_plain_json_is_parsed() {
    let body = br#"{"trxId": "TXN2000"}"#;
    let callback = normalize(body, "text/plain; charset=utf-8").unwrap();
    assert_eq!(callback.trade_reference, "TXN2000");
}

#[test]
fn content_type_parameters_are_ignored() {
    let body = br#"{"merchantTradeNo": "TXN3000"}"#;
    let callback = normalize(body, "application/json; charset=utf-8").unwrap();
    assert_eq!(callback.trade_reference, "TXN3000");
}

#[test]
fn reference_fields_resolve_in_priority_order() {
    let body = br#"{
        "orderId": "fourth",
        "trxId": "third",
        "merchant_trade_no": "second",
        "merchantTradeNo": "first"
    }"#;
    let callback = normalize(body, "application/json").unwrap();
    assert_eq!(callback.trade_reference, "first");

    let body = br#"{"orderId": "fourth", "trxId": "third"}"#;
    let callback = normalize(body, "application/json").unwrap();
    assert_eq!(callback.trade_reference, "third");
}

#[test]
fn numeric_order_id_becomes_a_string_reference() {
    let callback = normalize(br#"{"orderId": 420017}"#, "application/json").unwrap();
    assert_eq!(callback.trade_reference, "420017");
}

#[test]
fn payload_survives_normalization_for_status_extraction() {
    let body = b"merchant_trade_no=TXN1000&status=EXPIRED";
    let callback = normalize(body, "application/x-www-form-urlencoded").unwrap();
    assert_eq!(callback.payload["status"], "EXPIRED");
    assert_eq!(
        callback.received_content_type,
        "application/x-www-form-urlencoded"
    );
}

#[test]
fn empty_body_is_malformed() {
    let err = normalize(b"", "").unwrap_err();
    assert!(matches!(err, AppError::MalformedCallback(_)));
}

#[test]
fn body_without_any_reference_field_is_malformed() {
    let err = normalize(br#"{"status": "SUCCESS"}"#, "application/json").unwrap_err();
    assert!(matches!(err, AppError::MalformedCallback(_)));
}

#[test]
fn unparseable_body_is_malformed_even_with_json_content_type() {
    let err = normalize(b"<xml>nope</xml>", "application/json").unwrap_err();
    assert!(matches!(err, AppError::MalformedCallback(_)));
}

#[test]
fn mislabeled_json_under_form_content_type_still_normalizes() {
    let body = br#"{"merchantTradeNo": "TXN9000"}"#;
    let callback = normalize(body, "application/x-www-form-urlencoded").unwrap();
    assert_eq!(callback.trade_reference, "TXN9000");
}
