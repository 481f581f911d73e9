use crate::core::{AppError, Result};
use crate::modules::reconciliation::repositories::TradeStore;
use crate::modules::reconciliation::services::CheckoutService;
use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Configure checkout and operator routes
pub fn configure(
    cfg: &mut web::ServiceConfig,
    checkout: Arc<CheckoutService>,
    trades: Arc<dyn TradeStore>,
) {
    cfg.service(
        web::scope("/checkout")
            .app_data(web::Data::new(checkout))
            .app_data(web::Data::new(trades))
            .service(start_checkout)
            .service(unresolved_attempts)
            .service(attempt_status),
    );
}

#[derive(Debug, Deserialize)]
struct CheckoutRequest {
    user_id: String,
    redirect_url: String,
}

#[derive(Debug, Serialize)]
struct CheckoutResponse {
    merchant_trade_no: String,
    pay_url: String,
    amount_minor: i64,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Start a checkout for the user's current cart.
///
/// POST /checkout
///
/// Returns the hosted payment page to redirect the customer to. A gateway
/// rejection or transport failure surfaces as an error response and leaves
/// the cart intact; the customer can retry.
#[post("")]
async fn start_checkout(
    body: web::Json<CheckoutRequest>,
    checkout: web::Data<Arc<CheckoutService>>,
) -> Result<HttpResponse> {
    let outcome = checkout
        .checkout(&body.user_id, &body.redirect_url)
        .await?;

    info!(
        merchant_trade_no = %outcome.merchant_trade_no,
        user_id = %body.user_id,
        "Checkout ready for payment"
    );

    Ok(HttpResponse::Created().json(CheckoutResponse {
        merchant_trade_no: outcome.merchant_trade_no,
        pay_url: outcome.pay_url,
        amount_minor: outcome.amount_minor,
        expires_at: outcome.expires_at,
    }))
}

/// Operator queue: succeeded attempts whose order is still missing.
///
/// GET /checkout/unresolved
#[get("/unresolved")]
async fn unresolved_attempts(trades: web::Data<Arc<dyn TradeStore>>) -> Result<HttpResponse> {
    let attempts = trades.list_unresolved().await?;
    Ok(HttpResponse::Ok().json(attempts))
}

/// Look up one attempt by its trade reference, for status polling by the
/// surrounding application.
///
/// GET /checkout/{merchant_trade_no}
#[get("/{merchant_trade_no}")]
async fn attempt_status(
    path: web::Path<String>,
    trades: web::Data<Arc<dyn TradeStore>>,
) -> Result<HttpResponse> {
    let merchant_trade_no = path.into_inner();

    let attempt = trades
        .find_by_trade_no(&merchant_trade_no)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Attempt '{}' not found", merchant_trade_no)))?;

    Ok(HttpResponse::Ok().json(attempt))
}
