pub mod messages;
pub mod status;

pub use messages::{
    CreatePaymentRequest, CreatePaymentResponse, PaymentActions, PaymentCreated, PaymentQuery,
    QueryPaymentRequest, QueryPaymentResponse, SignedRequest,
};
pub use status::GatewayStatus;
