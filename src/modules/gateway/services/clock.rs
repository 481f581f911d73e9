use chrono::{DateTime, Duration, FixedOffset, Utc};

/// Gateway wall-clock offset: the processor validates timestamps against
/// Asia/Jakarta time (UTC+7).
const GATEWAY_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Seconds subtracted from the current time so a request whose clock runs
/// slightly ahead of the processor's is not rejected as from-the-future.
const CLOCK_SKEW_ALLOWANCE_SECS: i64 = 5;

fn gateway_offset() -> FixedOffset {
    // 7h east is always a representable offset
    FixedOffset::east_opt(GATEWAY_UTC_OFFSET_SECS).expect("valid UTC+7 offset")
}

fn gateway_now() -> DateTime<FixedOffset> {
    (Utc::now() - Duration::seconds(CLOCK_SKEW_ALLOWANCE_SECS)).with_timezone(&gateway_offset())
}

/// Timestamp for the `X-TIMESTAMP` header and the signing string:
/// `YYYY-MM-DDTHH:mm:ss.sss+07:00`, shifted 5 seconds into the past.
pub fn timestamp() -> String {
    gateway_now().format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

/// Correlation id for the `X-REQUEST-ID` header: `YYYYMMDDHHmmssSSS`,
/// 17 digits of gateway wall-clock time at millisecond precision.
///
/// Millisecond precision means two requests issued in the same millisecond
/// share an id. The processor tolerates this for correlation purposes;
/// callers that need strict uniqueness (merchant trade numbers do) must
/// append their own entropy.
pub fn request_id() -> String {
    gateway_now().format("%Y%m%d%H%M%S%3f").to_string()
}
