use crate::config::PollerConfig;
use crate::modules::gateway::services::PaymentProcessor;
use crate::modules::reconciliation::repositories::TradeStore;
use crate::modules::reconciliation::services::ReconciliationService;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

/// Background job reconciling attempts whose callback never arrived.
///
/// Queries the processor for every pending attempt older than the
/// configured age and feeds the answer to the state machine. The webhook
/// path stays authoritative for fresh attempts; the poller only sweeps up
/// behind lost deliveries.
pub struct ReconciliationPoller {
    trades: Arc<dyn TradeStore>,
    processor: Arc<dyn PaymentProcessor>,
    reconciler: Arc<ReconciliationService>,
    config: PollerConfig,
}

impl ReconciliationPoller {
    pub fn new(
        trades: Arc<dyn TradeStore>,
        processor: Arc<dyn PaymentProcessor>,
        reconciler: Arc<ReconciliationService>,
        config: PollerConfig,
    ) -> Self {
        Self {
            trades,
            processor,
            reconciler,
            config,
        }
    }

    /// Run forever. Spawn as a tokio task from main.
    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.config.interval_secs,
            "Starting reconciliation poller"
        );

        let mut ticker = interval(Duration::from_secs(self.config.interval_secs));

        loop {
            ticker.tick().await;

            match self.sweep().await {
                Ok(swept) => {
                    if swept > 0 {
                        info!(swept = swept, "Reconciliation sweep finished");
                    }
                }
                Err(e) => {
                    error!(error = %e, "Reconciliation sweep failed");
                }
            }
        }
    }

    /// One pass over stale pending attempts. A single attempt failing to
    /// reconcile does not stop the sweep.
    async fn sweep(&self) -> crate::core::Result<usize> {
        let min_age = chrono::Duration::seconds(self.config.min_pending_age_secs);
        let stale = self.trades.list_pending_older_than(min_age).await?;
        let mut swept = 0;

        for attempt in stale {
            let trade_no = attempt.merchant_trade_no;

            let query = match self.processor.query_payment(&trade_no).await {
                Ok(query) => query,
                Err(e) => {
                    error!(
                        merchant_trade_no = %trade_no,
                        error = %e,
                        "Payment query failed, will retry next sweep"
                    );
                    continue;
                }
            };

            match self.reconciler.apply(&trade_no, query.status, "poll").await {
                Ok(_) => swept += 1,
                Err(e) => {
                    error!(
                        merchant_trade_no = %trade_no,
                        error = %e,
                        "Reconciliation from poll failed"
                    );
                }
            }
        }

        Ok(swept)
    }
}
