pub mod trade_attempt;

pub use trade_attempt::{TradeAttempt, TradeStatus};
