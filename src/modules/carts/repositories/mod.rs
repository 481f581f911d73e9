use crate::core::Result;
use crate::modules::carts::models::{CartLine, CartSnapshot};
use async_trait::async_trait;
use sqlx::MySqlPool;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Cart collaborator seam.
///
/// The surrounding application owns cart contents; this pipeline only
/// snapshots a cart at checkout and clears it after an order materializes.
#[async_trait]
pub trait CartProvider: Send + Sync {
    /// Read-only snapshot with computed subtotal
    async fn snapshot(&self, user_id: &str) -> Result<CartSnapshot>;

    /// Empty the user's cart
    async fn clear(&self, user_id: &str) -> Result<()>;
}

/// MySQL-backed cart adapter reading the application's cart_items table
pub struct MySqlCartStore {
    pool: MySqlPool,
}

impl MySqlCartStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartProvider for MySqlCartStore {
    async fn snapshot(&self, user_id: &str) -> Result<CartSnapshot> {
        let lines = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT product_id, name, quantity, unit_price_usd
            FROM cart_items
            WHERE user_id = ?
            ORDER BY product_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(CartSnapshot::new(
            user_id.to_string(),
            lines.into_iter().map(CartLineRow::into_line).collect(),
        ))
    }

    async fn clear(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    product_id: String,
    name: String,
    quantity: u32,
    unit_price_usd: rust_decimal::Decimal,
}

impl CartLineRow {
    fn into_line(self) -> CartLine {
        CartLine {
            product_id: self.product_id,
            name: self.name,
            quantity: self.quantity,
            unit_price_usd: self.unit_price_usd,
        }
    }
}

/// In-memory cart store for tests and local development
#[derive(Default)]
pub struct MemoryCartStore {
    carts: Mutex<HashMap<String, Vec<CartLine>>>,
    clears: std::sync::atomic::AtomicUsize,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user's cart
    pub async fn stock(&self, user_id: &str, lines: Vec<CartLine>) {
        self.carts.lock().await.insert(user_id.to_string(), lines);
    }

    pub async fn is_cleared(&self, user_id: &str) -> bool {
        self.carts
            .lock()
            .await
            .get(user_id)
            .map(Vec::is_empty)
            .unwrap_or(true)
    }

    /// How many times clear() was called, across all users
    pub fn clear_count(&self) -> usize {
        self.clears.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl CartProvider for MemoryCartStore {
    async fn snapshot(&self, user_id: &str) -> Result<CartSnapshot> {
        let lines = self
            .carts
            .lock()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        Ok(CartSnapshot::new(user_id.to_string(), lines))
    }

    async fn clear(&self, user_id: &str) -> Result<()> {
        self.clears
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.carts.lock().await.remove(user_id);
        Ok(())
    }
}
