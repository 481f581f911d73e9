use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the currently cached exchange rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Primary,
    Backup,
    StaticDefault,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateSource::Primary => write!(f, "primary"),
            RateSource::Backup => write!(f, "backup"),
            RateSource::StaticDefault => write!(f, "static_default"),
        }
    }
}

/// The single process-wide USD -> IDR exchange rate.
///
/// Never invalidated, only replaced: a failed refresh leaves the previous
/// value in place so conversion always has something to multiply by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub rate: Decimal,
    pub source: RateSource,
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn new(rate: Decimal, source: RateSource) -> Self {
        Self {
            rate,
            source,
            fetched_at: Utc::now(),
        }
    }

    /// True when the rate is older than the given maximum age.
    pub fn is_stale(&self, max_age: chrono::Duration) -> bool {
        Utc::now() - self.fetched_at > max_age
    }
}
