// Conversion properties of the exchange-rate cache: deterministic rounding,
// graceful degradation when feeds fail, and the half-up minor-unit rule.

use async_trait::async_trait;
use paybridge::core::{AppError, Result};
use paybridge::modules::rates::models::RateSource;
use paybridge::modules::rates::services::{RateCache, RateFeed};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

struct DeadFeed(RateSource);

#[async_trait]
impl RateFeed for DeadFeed {
    fn source(&self) -> RateSource {
        self.0
    }

    async fn fetch(&self) -> Result<Decimal> {
        Err(AppError::rate_fetch("feed unreachable"))
    }
}

#[tokio::test]
async fn fifty_usd_at_15800_is_790000_rupiah() {
    let cache = RateCache::new(dec!(15800), vec![]);
    let converted = cache.convert(dec!(50), false).await;
    assert_eq!(converted, dec!(790000));
}

#[tokio::test]
async fn conversion_rounds_half_up_to_whole_rupiah() {
    let cache = RateCache::new(dec!(15800.5), vec![]);
    // 1.00 * 15800.5 = 15800.5 -> 15801, not banker's 15800
    assert_eq!(cache.convert(dec!(1), false).await, dec!(15801));
}

#[tokio::test]
async fn conversion_survives_both_feeds_failing() {
    let feeds: Vec<Arc<dyn RateFeed>> = vec![
        Arc::new(DeadFeed(RateSource::Primary)),
        Arc::new(DeadFeed(RateSource::Backup)),
    ];
    let cache = RateCache::new(dec!(15800), feeds);

    // Live conversion must not error even though every feed is down.
    let converted = cache.convert(dec!(50), true).await;
    assert_eq!(converted, dec!(790000));

    let current = cache.current().await;
    assert_eq!(current.source, RateSource::StaticDefault);
}

#[tokio::test]
async fn manual_override_takes_effect_immediately() {
    let cache = RateCache::new(dec!(15800), vec![]);
    cache.set_rate(dec!(16000)).await;
    assert_eq!(cache.convert(dec!(2), false).await, dec!(32000));
}

proptest! {
    #[test]
    fn conversion_is_monotone_within_one_rounding_unit(
        cents_a in 0u64..10_000_000u64,
        cents_b in 0u64..10_000_000u64,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");

        rt.block_on(async {
            let cache = RateCache::new(dec!(15800), vec![]);
            let a = Decimal::new(cents_a as i64, 2);
            let b = Decimal::new(cents_b as i64, 2);

            let sum_of_parts =
                cache.convert(a, false).await + cache.convert(b, false).await;
            let whole = cache.convert(a + b, false).await;

            // Rounding each part separately can differ from rounding the
            // sum by at most one minor unit.
            let drift = (sum_of_parts - whole).abs();
            prop_assert!(drift <= Decimal::ONE, "drift {} for {} + {}", drift, a, b);
            Ok(())
        })?;
    }

    #[test]
    fn conversion_is_deterministic(cents in 0u64..100_000_000u64) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");

        rt.block_on(async {
            let cache = RateCache::new(dec!(15800), vec![]);
            let amount = Decimal::new(cents as i64, 2);
            let first = cache.convert(amount, false).await;
            let second = cache.convert(amount, false).await;
            prop_assert_eq!(first, second);
            Ok(())
        })?;
    }
}
