pub mod models;
pub mod services;

pub use models::{GatewayStatus, PaymentCreated, PaymentQuery, SignedRequest};
pub use services::{GatewayClient, PaymentProcessor, RequestSigner};
