pub mod models;
pub mod repositories;

pub use models::OrderRecord;
pub use repositories::{MemoryOrderStore, MySqlOrderStore, OrderOutcome, OrderStore};
