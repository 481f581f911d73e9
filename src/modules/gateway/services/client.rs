use crate::config::GatewayConfig;
use crate::core::{AppError, Result};
use crate::modules::gateway::models::{
    CreatePaymentRequest, CreatePaymentResponse, GatewayStatus, PaymentCreated, PaymentQuery,
    QueryPaymentRequest, QueryPaymentResponse, SignedRequest,
};
use crate::modules::gateway::services::clock;
use crate::modules::gateway::services::signing::RequestSigner;
use crate::modules::reconciliation::models::TradeAttempt;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

/// Seam between checkout/reconciliation and the wire protocol. The real
/// client signs and sends HTTPS requests; tests substitute a stub.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Ask the processor to open a payment for the attempt. Reports
    /// processor state only; the caller owns all local state transitions.
    async fn create_payment(&self, attempt: &TradeAttempt) -> Result<PaymentCreated>;

    /// Ask the processor for the current state of a payment.
    async fn query_payment(&self, merchant_trade_no: &str) -> Result<PaymentQuery>;
}

/// Signed HTTP client for the card processor
///
/// Every call is signed over the exact body bytes sent, carries the
/// `X-TIMESTAMP` / `X-SIGNATURE` / `X-PARTNER-ID` / `X-REQUEST-ID` headers,
/// and runs under a 30 second timeout. Any HTTP status >= 400 surfaces as
/// `GatewayRejected`, never as success.
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
    signer: RequestSigner,
}

impl GatewayClient {
    /// Create a client for the configured processor endpoint.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let signer = RequestSigner::from_key_material(&config.private_key)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(AppError::Transport)?;

        Ok(Self {
            client,
            config,
            signer,
        })
    }

    fn operation_path(&self, operation: &str) -> String {
        format!("/payment/{}/cc/{}", self.config.api_version, operation)
    }

    /// Sign and dispatch one request, returning the raw response body.
    async fn dispatch(&self, signed: SignedRequest) -> Result<String> {
        let url = format!("{}{}", self.config.base_url, signed.path);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("X-TIMESTAMP", &signed.timestamp)
            .header("X-SIGNATURE", &signed.signature)
            .header("X-PARTNER-ID", &signed.partner_id)
            .header("X-REQUEST-ID", &signed.request_id)
            .body(signed.body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() >= 400 {
            error!(
                path = %signed.path,
                http_status = status.as_u16(),
                "Gateway rejected request"
            );
            return Err(AppError::GatewayRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl PaymentProcessor for GatewayClient {
    async fn create_payment(&self, attempt: &TradeAttempt) -> Result<PaymentCreated> {
        let path = self.operation_path("create");
        let request_id = clock::request_id();

        let body = CreatePaymentRequest {
            partner_id: self.config.partner_id.clone(),
            merchant_trade_no: attempt.merchant_trade_no.clone(),
            request_id: request_id.clone(),
            amount: attempt.amount_minor,
            currency: "IDR".to_string(),
            product_descriptor: attempt.descriptor.clone(),
            redirect_url: attempt.redirect_url.clone(),
        };

        // Serialize once: the signature covers these exact bytes.
        let body = serde_json::to_string(&body)?;
        let signed =
            self.signer
                .sign_request("POST", &path, body, &self.config.partner_id, request_id)?;

        info!(
            merchant_trade_no = %attempt.merchant_trade_no,
            amount_minor = attempt.amount_minor,
            request_id = %signed.request_id,
            "Creating payment"
        );

        let raw = self.dispatch(signed).await?;
        let response: CreatePaymentResponse = serde_json::from_str(&raw)?;

        info!(
            merchant_trade_no = %attempt.merchant_trade_no,
            platform_trade_no = %response.platform_trade_no,
            status = %response.status,
            "Payment created"
        );

        Ok(PaymentCreated {
            platform_trade_no: response.platform_trade_no,
            status: GatewayStatus::from_code(&response.status),
            pay_url: response.payment_actions.pay_url,
            expires_at: response.expired_time,
        })
    }

    async fn query_payment(&self, merchant_trade_no: &str) -> Result<PaymentQuery> {
        let path = self.operation_path("query");
        let request_id = clock::request_id();

        let body = QueryPaymentRequest {
            partner_id: self.config.partner_id.clone(),
            merchant_trade_no: merchant_trade_no.to_string(),
            request_id: request_id.clone(),
        };

        let body = serde_json::to_string(&body)?;
        let signed =
            self.signer
                .sign_request("POST", &path, body, &self.config.partner_id, request_id)?;

        let raw = self.dispatch(signed).await?;
        let response: QueryPaymentResponse = serde_json::from_str(&raw)?;

        info!(
            merchant_trade_no = %merchant_trade_no,
            status = %response.status,
            "Payment queried"
        );

        Ok(PaymentQuery {
            status: GatewayStatus::from_code(&response.status),
            raw: serde_json::from_str(&raw)?,
        })
    }
}
