pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{TradeAttempt, TradeStatus};
pub use repositories::{MemoryTradeStore, MySqlTradeStore, TradeStore};
pub use services::{CheckoutService, ReconcileOutcome, ReconciliationPoller, ReconciliationService};
