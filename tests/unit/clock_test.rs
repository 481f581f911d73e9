// Format guarantees of the gateway clock: the processor parses these
// strings, so shape regressions are wire-protocol breakage.

use chrono::{DateTime, Duration, Utc};
use paybridge::modules::gateway::services::clock;

#[test]
fn timestamp_has_the_documented_shape() {
    let ts = clock::timestamp();

    // YYYY-MM-DDTHH:mm:ss.sss+07:00
    assert_eq!(ts.len(), 29, "got '{}'", ts);
    assert!(ts.ends_with("+07:00"));
    assert_eq!(&ts[10..11], "T");
    assert_eq!(&ts[19..20], ".");

    // Must parse back as a valid RFC 3339 instant.
    assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
}

#[test]
fn timestamp_absorbs_clock_skew() {
    let ts = clock::timestamp();
    let parsed = DateTime::parse_from_rfc3339(&ts).unwrap().with_timezone(&Utc);
    let lag = Utc::now() - parsed;

    // Shifted 5 seconds into the past, give or take test latency.
    assert!(lag >= Duration::seconds(4), "lag {}", lag);
    assert!(lag <= Duration::seconds(7), "lag {}", lag);
}

#[test]
fn request_id_is_seventeen_digits() {
    let id = clock::request_id();
    assert_eq!(id.len(), 17);
    assert!(id.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn request_id_encodes_the_current_date() {
    let id = clock::request_id();
    // Offset "now" the same way the clock does before comparing dates, so
    // the test does not flake across midnight.
    let expected_prefix = (Utc::now() - Duration::seconds(5))
        .with_timezone(&chrono::FixedOffset::east_opt(7 * 3600).unwrap())
        .format("%Y%m%d")
        .to_string();
    assert!(id.starts_with(&expected_prefix), "id {}", id);
}

#[test]
fn request_ids_are_monotone_within_a_run() {
    let first = clock::request_id();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = clock::request_id();
    // Millisecond precision means collisions are possible in principle;
    // 5ms apart they must differ and order lexicographically.
    assert!(second > first, "{} then {}", first, second);
}
