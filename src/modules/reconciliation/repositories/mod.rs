pub mod trade_repository;

pub use trade_repository::{MemoryTradeStore, MySqlTradeStore, TradeStore};
