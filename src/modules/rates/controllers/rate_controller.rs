use crate::core::{AppError, Result};
use crate::modules::rates::services::RateCache;
use actix_web::{get, put, web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Configure exchange-rate routes
pub fn configure(cfg: &mut web::ServiceConfig, rates: Arc<RateCache>) {
    cfg.service(
        web::scope("/rates")
            .app_data(web::Data::new(rates))
            .service(current_rate)
            .service(override_rate),
    );
}

/// Inspect the cached exchange rate.
///
/// GET /rates/current
#[get("/current")]
async fn current_rate(rates: web::Data<Arc<RateCache>>) -> Result<HttpResponse> {
    let current = rates.current().await;
    Ok(HttpResponse::Ok().json(current))
}

#[derive(Debug, Deserialize)]
struct OverrideRateRequest {
    rate: Decimal,
}

/// Operational override of the cached exchange rate.
///
/// PUT /rates/current
///
/// Replaces the rate immediately and restarts its refresh TTL.
#[put("/current")]
async fn override_rate(
    rates: web::Data<Arc<RateCache>>,
    body: web::Json<OverrideRateRequest>,
) -> Result<HttpResponse> {
    if body.rate <= Decimal::ZERO {
        return Err(AppError::validation("Exchange rate must be positive"));
    }

    rates.set_rate(body.rate).await;
    info!(rate = %body.rate, "Exchange rate overridden via API");

    let current = rates.current().await;
    Ok(HttpResponse::Ok().json(current))
}
