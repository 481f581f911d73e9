pub mod callbacks;
pub mod carts;
pub mod gateway;
pub mod orders;
pub mod rates;
pub mod reconciliation;
