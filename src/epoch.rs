//! Conversions between the three native history-timestamp encodings and
//! canonical Unix seconds (UTC).
//!
//! Every backend family stores visit times differently:
//!
//! | Family | Native encoding |
//! |--------|-----------------|
//! | firefox | microseconds since 1970-01-01 UTC |
//! | chrome, edge | microseconds since 1601-01-01 UTC |
//! | safari | (fractional) seconds since 2001-01-01 UTC |
//!
//! The forward conversions are total: they never fail, and malformed native
//! values come out at or below zero so callers can discard the row. The
//! inverse conversions turn a canonical watermark back into a native query
//! parameter; a watermark at or below zero maps to native zero, which makes
//! the first run a full scan.
//!
//! The offset arithmetic is done in native integer units before widening to
//! f64, so a native → canonical → native round trip stays within one native
//! unit. Losing more than that here would either re-collect old rows or miss
//! new ones at the watermark boundary.

/// Seconds between 1601-01-01 and 1970-01-01 (the NT/Chromium epoch gap).
pub const EPOCH_1601_OFFSET_SECS: i64 = 11_644_473_600;

/// Seconds between 1970-01-01 and 2001-01-01 (the Cocoa/Safari epoch gap).
pub const EPOCH_2001_OFFSET_SECS: f64 = 978_307_200.0;

const MICROS_PER_SEC: f64 = 1_000_000.0;
const EPOCH_1601_OFFSET_MICROS: i64 = EPOCH_1601_OFFSET_SECS * 1_000_000;

/// Firefox `moz_historyvisits.visit_date`: microseconds since the Unix epoch.
pub fn firefox_us_to_unix(us: i64) -> f64 {
    us as f64 / MICROS_PER_SEC
}

/// Canonical watermark → firefox native microseconds.
pub fn unix_to_firefox_us(ts: f64) -> i64 {
    if ts <= 0.0 {
        return 0;
    }
    (ts * MICROS_PER_SEC) as i64
}

/// Chromium `visits.visit_time`: microseconds since 1601-01-01 UTC.
pub fn chromium_us_to_unix(us: i64) -> f64 {
    (us - EPOCH_1601_OFFSET_MICROS) as f64 / MICROS_PER_SEC
}

/// Canonical watermark → chromium native microseconds.
pub fn unix_to_chromium_us(ts: f64) -> i64 {
    if ts <= 0.0 {
        return 0;
    }
    (ts * MICROS_PER_SEC) as i64 + EPOCH_1601_OFFSET_MICROS
}

/// Safari `history_visits.visit_time`: seconds since 2001-01-01 UTC.
pub fn safari_s_to_unix(s: f64) -> f64 {
    s + EPOCH_2001_OFFSET_SECS
}

/// Canonical watermark → safari native seconds.
pub fn unix_to_safari_s(ts: f64) -> f64 {
    if ts <= 0.0 {
        return 0.0;
    }
    ts - EPOCH_2001_OFFSET_SECS
}

/// Round a canonical timestamp to millisecond precision, the precision the
/// event log stores.
pub fn round_ms(ts: f64) -> f64 {
    (ts * 1000.0).round() / 1000.0
}
