pub mod checkout_service;
pub mod poller;
pub mod reconciler;

pub use checkout_service::{CheckoutOutcome, CheckoutService};
pub use poller::ReconciliationPoller;
pub use reconciler::{ReconcileOutcome, ReconciliationService};
