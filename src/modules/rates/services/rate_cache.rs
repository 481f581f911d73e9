use crate::core::Currency;
use crate::modules::rates::models::{ExchangeRate, RateSource};
use crate::modules::rates::services::RateFeed;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Process-wide USD -> IDR conversion cache.
///
/// Constructed once at service start and injected wherever conversion is
/// needed; there is no ambient global instance. Refreshes go through a
/// single-flight guard: while one refresh is in flight, concurrent callers
/// convert with the prior cached value instead of piling onto the feeds.
pub struct RateCache {
    current: RwLock<ExchangeRate>,
    refresh_gate: Mutex<()>,
    feeds: Vec<Arc<dyn RateFeed>>,
    max_age: chrono::Duration,
}

impl RateCache {
    /// Create a cache seeded with the static default rate.
    ///
    /// # Arguments
    /// * `default_rate` - Deterministic fallback rate used until the first
    ///   successful fetch
    /// * `feeds` - Rate feeds in preference order (primary first, then backup)
    pub fn new(default_rate: Decimal, feeds: Vec<Arc<dyn RateFeed>>) -> Self {
        Self {
            current: RwLock::new(ExchangeRate::new(default_rate, RateSource::StaticDefault)),
            refresh_gate: Mutex::new(()),
            feeds,
            max_age: chrono::Duration::hours(24),
        }
    }

    /// Convert a USD amount into whole rupiah, rounded half-up.
    ///
    /// With `use_live_rate == false` this is pure arithmetic on the cached
    /// rate (no I/O, safe on hot read paths). With `use_live_rate == true`
    /// a stale cache is refreshed first; refresh failure degrades to the
    /// cached value and never surfaces to the caller.
    pub async fn convert(&self, amount_usd: Decimal, use_live_rate: bool) -> Decimal {
        if use_live_rate {
            self.refresh_if_stale().await;
        }

        let rate = self.current.read().await.clone();
        let converted = Currency::IDR.round_half_up(amount_usd * rate.rate);

        debug!(
            amount_usd = %amount_usd,
            rate = %rate.rate,
            rate_source = %rate.source,
            converted_idr = %converted,
            "Converted amount"
        );

        converted
    }

    /// Snapshot of the currently cached rate
    pub async fn current(&self) -> ExchangeRate {
        self.current.read().await.clone()
    }

    /// Operational override: replace the cached rate and restart its TTL.
    pub async fn set_rate(&self, rate: Decimal) {
        let mut current = self.current.write().await;
        *current = ExchangeRate::new(rate, RateSource::StaticDefault);
        info!(rate = %rate, "Exchange rate set manually");
    }

    /// Refresh the cached rate when it is older than 24 hours.
    ///
    /// Feeds are tried in order; the first success wins. When every feed
    /// fails the stale value stays in place. Only one refresh runs at a
    /// time: losers of the guard race return immediately and convert with
    /// whatever is cached.
    async fn refresh_if_stale(&self) {
        if !self.current.read().await.is_stale(self.max_age) {
            return;
        }

        let _guard = match self.refresh_gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Rate refresh already in flight, using cached value");
                return;
            }
        };

        // Re-check under the guard: the refresh we raced may have finished.
        if !self.current.read().await.is_stale(self.max_age) {
            return;
        }

        for feed in &self.feeds {
            match feed.fetch().await {
                Ok(rate) => {
                    let fresh = ExchangeRate::new(rate, feed.source());
                    let mut current = self.current.write().await;
                    info!(
                        rate = %fresh.rate,
                        rate_source = %fresh.source,
                        previous = %current.rate,
                        "Exchange rate refreshed"
                    );
                    *current = fresh;
                    return;
                }
                Err(e) => {
                    warn!(
                        rate_source = %feed.source(),
                        error = %e,
                        "Rate feed failed, trying next"
                    );
                }
            }
        }

        let current = self.current.read().await;
        warn!(
            rate = %current.rate,
            rate_source = %current.source,
            fetched_at = %current.fetched_at,
            "All rate feeds failed, continuing with cached rate"
        );
    }
}
