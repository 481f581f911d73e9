use crate::core::Result;
use crate::modules::reconciliation::models::{TradeAttempt, TradeStatus};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::MySqlPool;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Persistence seam for trade attempts.
///
/// Status changes go through `transition`, a compare-and-set keyed on the
/// expected current status, so two racing reconciliation paths cannot both
/// believe they performed the same transition.
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn create(&self, attempt: &TradeAttempt) -> Result<()>;

    async fn find_by_trade_no(&self, merchant_trade_no: &str) -> Result<Option<TradeAttempt>>;

    /// Compare-and-set the status. Returns true when this call performed
    /// the transition, false when the attempt was not in `from` anymore.
    async fn transition(
        &self,
        merchant_trade_no: &str,
        from: TradeStatus,
        to: TradeStatus,
    ) -> Result<bool>;

    /// Record the processor's create-call results and move the attempt
    /// from `Created` to `Pending` in one step.
    async fn mark_pending(
        &self,
        merchant_trade_no: &str,
        platform_trade_no: &str,
        pay_url: &str,
    ) -> Result<bool>;

    /// Flag a succeeded attempt whose order could not be created.
    async fn mark_unresolved(&self, merchant_trade_no: &str) -> Result<()>;

    /// Clear the unresolved flag once the order exists.
    async fn clear_unresolved(&self, merchant_trade_no: &str) -> Result<()>;

    /// Pending attempts older than `min_age`, for poll-driven reconciliation
    async fn list_pending_older_than(&self, min_age: Duration) -> Result<Vec<TradeAttempt>>;

    /// Operator queue: succeeded attempts with no materialized order
    async fn list_unresolved(&self) -> Result<Vec<TradeAttempt>>;
}

/// MySQL-backed trade attempt repository
pub struct MySqlTradeStore {
    pool: MySqlPool,
}

impl MySqlTradeStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT merchant_trade_no, user_id, amount_minor, descriptor, redirect_url,
           status, platform_trade_no, pay_url, cart_snapshot, unresolved,
           created_at, updated_at
    FROM trade_attempts
"#;

#[async_trait]
impl TradeStore for MySqlTradeStore {
    async fn create(&self, attempt: &TradeAttempt) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO trade_attempts (
                merchant_trade_no, user_id, amount_minor, descriptor,
                redirect_url, status, cart_snapshot, unresolved
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&attempt.merchant_trade_no)
        .bind(&attempt.user_id)
        .bind(attempt.amount_minor)
        .bind(&attempt.descriptor)
        .bind(&attempt.redirect_url)
        .bind(attempt.status)
        .bind(&attempt.cart_snapshot)
        .bind(attempt.unresolved)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_trade_no(&self, merchant_trade_no: &str) -> Result<Option<TradeAttempt>> {
        let attempt = sqlx::query_as::<_, TradeAttempt>(&format!(
            "{} WHERE merchant_trade_no = ?",
            SELECT_COLUMNS
        ))
        .bind(merchant_trade_no)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn transition(
        &self,
        merchant_trade_no: &str,
        from: TradeStatus,
        to: TradeStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE trade_attempts
            SET status = ?, updated_at = NOW()
            WHERE merchant_trade_no = ? AND status = ?
            "#,
        )
        .bind(to)
        .bind(merchant_trade_no)
        .bind(from)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_pending(
        &self,
        merchant_trade_no: &str,
        platform_trade_no: &str,
        pay_url: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE trade_attempts
            SET status = ?, platform_trade_no = ?, pay_url = ?, updated_at = NOW()
            WHERE merchant_trade_no = ? AND status = ?
            "#,
        )
        .bind(TradeStatus::Pending)
        .bind(platform_trade_no)
        .bind(pay_url)
        .bind(merchant_trade_no)
        .bind(TradeStatus::Created)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_unresolved(&self, merchant_trade_no: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE trade_attempts
            SET unresolved = TRUE, updated_at = NOW()
            WHERE merchant_trade_no = ?
            "#,
        )
        .bind(merchant_trade_no)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear_unresolved(&self, merchant_trade_no: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE trade_attempts
            SET unresolved = FALSE, updated_at = NOW()
            WHERE merchant_trade_no = ?
            "#,
        )
        .bind(merchant_trade_no)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_pending_older_than(&self, min_age: Duration) -> Result<Vec<TradeAttempt>> {
        let cutoff = Utc::now() - min_age;

        let attempts = sqlx::query_as::<_, TradeAttempt>(&format!(
            "{} WHERE status = ? AND created_at < ? ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .bind(TradeStatus::Pending)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    async fn list_unresolved(&self) -> Result<Vec<TradeAttempt>> {
        let attempts = sqlx::query_as::<_, TradeAttempt>(&format!(
            "{} WHERE unresolved = TRUE ORDER BY updated_at",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }
}

/// In-memory trade store for tests and local development
#[derive(Default)]
pub struct MemoryTradeStore {
    attempts: Mutex<HashMap<String, TradeAttempt>>,
}

impl MemoryTradeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TradeStore for MemoryTradeStore {
    async fn create(&self, attempt: &TradeAttempt) -> Result<()> {
        self.attempts
            .lock()
            .await
            .insert(attempt.merchant_trade_no.clone(), attempt.clone());
        Ok(())
    }

    async fn find_by_trade_no(&self, merchant_trade_no: &str) -> Result<Option<TradeAttempt>> {
        Ok(self.attempts.lock().await.get(merchant_trade_no).cloned())
    }

    async fn transition(
        &self,
        merchant_trade_no: &str,
        from: TradeStatus,
        to: TradeStatus,
    ) -> Result<bool> {
        let mut attempts = self.attempts.lock().await;
        match attempts.get_mut(merchant_trade_no) {
            Some(attempt) if attempt.status == from => {
                attempt.status = to;
                attempt.updated_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_pending(
        &self,
        merchant_trade_no: &str,
        platform_trade_no: &str,
        pay_url: &str,
    ) -> Result<bool> {
        let mut attempts = self.attempts.lock().await;
        match attempts.get_mut(merchant_trade_no) {
            Some(attempt) if attempt.status == TradeStatus::Created => {
                attempt.status = TradeStatus::Pending;
                attempt.platform_trade_no = Some(platform_trade_no.to_string());
                attempt.pay_url = Some(pay_url.to_string());
                attempt.updated_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_unresolved(&self, merchant_trade_no: &str) -> Result<()> {
        if let Some(attempt) = self.attempts.lock().await.get_mut(merchant_trade_no) {
            attempt.unresolved = true;
            attempt.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn clear_unresolved(&self, merchant_trade_no: &str) -> Result<()> {
        if let Some(attempt) = self.attempts.lock().await.get_mut(merchant_trade_no) {
            attempt.unresolved = false;
            attempt.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn list_pending_older_than(&self, min_age: Duration) -> Result<Vec<TradeAttempt>> {
        let cutoff = Utc::now() - min_age;
        Ok(self
            .attempts
            .lock()
            .await
            .values()
            .filter(|a| {
                a.status == TradeStatus::Pending
                    && a.created_at.map(|t| t < cutoff).unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn list_unresolved(&self) -> Result<Vec<TradeAttempt>> {
        Ok(self
            .attempts
            .lock()
            .await
            .values()
            .filter(|a| a.unresolved)
            .cloned()
            .collect())
    }
}
