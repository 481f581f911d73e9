pub mod controllers;
pub mod models;
pub mod services;

pub use models::NormalizedCallback;
pub use services::normalize;
