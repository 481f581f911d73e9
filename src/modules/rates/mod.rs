pub mod controllers;
pub mod models;
pub mod services;

pub use models::{ExchangeRate, RateSource};
pub use services::{HttpRateFeed, RateCache, RateFeed};
