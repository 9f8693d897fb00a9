//! Timestamp helpers.
//!
//! All timestamps are RFC 3339 UTC with microseconds and a `Z` suffix. The
//! format is fixed width, so string order equals chronological order.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};

fn format(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time as a sortable timestamp string.
pub fn now_timestamp() -> String {
    format(Utc::now())
}

/// A timestamp strictly after `previous`, normally "now".
///
/// Two mutations inside the same microsecond (or a clock step backwards)
/// would otherwise produce a non-increasing `updated_at`. Unparseable
/// previous values are ignored.
pub fn later_than(previous: &str) -> String {
    let now = Utc::now().trunc_subsecs(6);
    match DateTime::parse_from_rfc3339(previous) {
        Ok(prev) => {
            let prev = prev.with_timezone(&Utc);
            if now > prev {
                format(now)
            } else {
                format(prev + Duration::microseconds(1))
            }
        }
        Err(_) => format(now),
    }
}
