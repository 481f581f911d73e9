use crate::core::Result;
use crate::modules::orders::models::OrderRecord;
use async_trait::async_trait;
use sqlx::MySqlPool;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;

/// Result of a compare-and-create against the order store.
///
/// Conflict is not an error: a second writer losing the race is exactly
/// how duplicate success signals stay idempotent.
#[derive(Debug, Clone)]
pub enum OrderOutcome {
    /// This call created the order
    Created(OrderRecord),
    /// An order with this trade number already existed
    Conflict(OrderRecord),
}

/// Order-store collaborator seam.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Atomically create the order unless one already exists for its
    /// `merchant_trade_no`. This is the pipeline's sole mutual-exclusion
    /// point, so it must hold across processes.
    async fn create_if_absent(&self, order: OrderRecord) -> Result<OrderOutcome>;

    async fn find_by_trade_no(&self, merchant_trade_no: &str) -> Result<Option<OrderRecord>>;
}

/// MySQL-backed order store.
///
/// Compare-and-create rides on the UNIQUE index over `merchant_trade_no`:
/// the duplicate-key violation from a lost race is translated into
/// `OrderOutcome::Conflict`, so concurrent webhook and poll deliveries in
/// different processes still produce exactly one row.
pub struct MySqlOrderStore {
    pool: MySqlPool,
}

impl MySqlOrderStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for MySqlOrderStore {
    async fn create_if_absent(&self, order: OrderRecord) -> Result<OrderOutcome> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO orders (id, merchant_trade_no, user_id, lines, total_usd, total_minor)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(&order.merchant_trade_no)
        .bind(&order.user_id)
        .bind(&order.lines)
        .bind(order.total_usd)
        .bind(order.total_minor)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {
                info!(
                    merchant_trade_no = %order.merchant_trade_no,
                    order_id = %order.id,
                    "Order created"
                );
                Ok(OrderOutcome::Created(order))
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                let existing = self
                    .find_by_trade_no(&order.merchant_trade_no)
                    .await?
                    .ok_or_else(|| {
                        // The row that beat us must be visible by now.
                        crate::core::AppError::internal(format!(
                            "order for '{}' conflicted but is not readable",
                            order.merchant_trade_no
                        ))
                    })?;
                Ok(OrderOutcome::Conflict(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_trade_no(&self, merchant_trade_no: &str) -> Result<Option<OrderRecord>> {
        let order = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, merchant_trade_no, user_id, lines, total_usd, total_minor, created_at
            FROM orders
            WHERE merchant_trade_no = ?
            "#,
        )
        .bind(merchant_trade_no)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }
}

/// In-memory order store for tests and local development
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<String, OrderRecord>>,
    /// When set, create_if_absent fails, simulating an order store outage
    fail_creates: std::sync::atomic::AtomicBool,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_creates(&self, fail: bool) {
        self.fail_creates
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub async fn count(&self) -> usize {
        self.orders.lock().await.len()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create_if_absent(&self, order: OrderRecord) -> Result<OrderOutcome> {
        if self.fail_creates.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(crate::core::AppError::internal("order store unavailable"));
        }

        let mut orders = self.orders.lock().await;
        match orders.entry(order.merchant_trade_no.clone()) {
            Entry::Occupied(existing) => Ok(OrderOutcome::Conflict(existing.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(order.clone());
                Ok(OrderOutcome::Created(order))
            }
        }
    }

    async fn find_by_trade_no(&self, merchant_trade_no: &str) -> Result<Option<OrderRecord>> {
        Ok(self.orders.lock().await.get(merchant_trade_no).cloned())
    }
}
