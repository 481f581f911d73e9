pub mod models;
pub mod repositories;

pub use models::{CartLine, CartSnapshot};
pub use repositories::{CartProvider, MemoryCartStore, MySqlCartStore};
