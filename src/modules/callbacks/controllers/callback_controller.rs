use crate::core::Result;
use crate::modules::callbacks::services::normalize;
use crate::modules::gateway::models::GatewayStatus;
use crate::modules::reconciliation::services::ReconciliationService;
use actix_web::{post, web, HttpMessage, HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::info;

/// Configure webhook routes
///
/// # Arguments
/// * `cfg` - Service configuration
/// * `reconciler` - Reconciliation state machine the callbacks feed
pub fn configure(cfg: &mut web::ServiceConfig, reconciler: Arc<ReconciliationService>) {
    cfg.service(
        web::scope("/webhooks")
            .app_data(web::Data::new(reconciler))
            .service(receive_payment_callback),
    );
}

/// Receive a payment callback from the processor.
///
/// POST /webhooks/payment
///
/// The processor delivers callbacks as JSON, form-urlencoded, or
/// unlabeled JSON text; all are normalized into one shape. Structurally
/// valid deliveries, including duplicates and replays after a terminal
/// state, are always acknowledged with 200 so the processor stops
/// retrying; the state machine applies each transition at most once.
/// Only a body with no extractable trade reference is rejected (400).
#[post("/payment")]
async fn receive_payment_callback(
    req: HttpRequest,
    body: web::Bytes,
    reconciler: web::Data<Arc<ReconciliationService>>,
) -> Result<HttpResponse> {
    let content_type = req.content_type().to_string();

    let callback = normalize(&body, &content_type)?;
    let status = GatewayStatus::from_callback(&callback.payload);

    info!(
        merchant_trade_no = %callback.trade_reference,
        status = %status,
        content_type = %callback.received_content_type,
        "Received payment callback"
    );

    let outcome = reconciler
        .apply(&callback.trade_reference, status, "webhook")
        .await?;

    info!(
        merchant_trade_no = %callback.trade_reference,
        outcome = ?outcome,
        "Callback applied"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}
