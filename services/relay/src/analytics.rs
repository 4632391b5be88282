//! Session usage aggregation
//!
//! Durations are handled in hundredths of a minute, computed from integer
//! milliseconds, so rounding is exact: each peer's time is rounded half
//! away from zero before it is added to its user's total.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::models::session::{Session, SessionAnalytics, UserDurationSummary};

const MILLIS_PER_HUNDREDTH_MINUTE: i64 = 600;

/// Signed span between two instants, in hundredths of a minute
///
/// Rounds half away from zero. `to` before `from` yields a negative value.
pub fn hundredths_of_minute(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let millis = (to - from).num_milliseconds();
    let half = MILLIS_PER_HUNDREDTH_MINUTE / 2;

    if millis >= 0 {
        (millis + half) / MILLIS_PER_HUNDREDTH_MINUTE
    } else {
        -((-millis + half) / MILLIS_PER_HUNDREDTH_MINUTE)
    }
}

/// Render hundredths of a minute with exactly two decimals, e.g. `1200` as `"12.00"`
pub fn format_minutes(hundredths: i64) -> String {
    let sign = if hundredths < 0 { "-" } else { "" };
    let abs = hundredths.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Aggregate one session's peers into per-user and session-wide durations
///
/// Peers that never left are measured up to `now`. Users are listed in the
/// order they first appear when peers are walked by ascending peer id; a
/// later peer of the same user overwrites the displayed name.
pub fn aggregate(session: &Session, now: DateTime<Utc>) -> SessionAnalytics {
    let mut per_user: IndexMap<&str, (&str, i64)> = IndexMap::new();

    for peer in session.peers.values() {
        let left_at = peer.left_at.unwrap_or(now);
        let duration = hundredths_of_minute(peer.joined_at, left_at);

        per_user
            .entry(peer.user_id.as_str())
            .and_modify(|(name, total)| {
                *name = peer.name.as_str();
                *total += duration;
            })
            .or_insert((peer.name.as_str(), duration));
    }

    let total: i64 = per_user.values().map(|(_, duration)| duration).sum();

    let user_duration_list = per_user
        .into_iter()
        .map(|(user_id, (name, duration))| UserDurationSummary {
            name: name.to_string(),
            user_id: user_id.to_string(),
            duration_minutes: duration as f64 / 100.0,
        })
        .collect();

    SessionAnalytics {
        user_duration_list,
        session_duration: format_minutes(hundredths_of_minute(
            session.created_at,
            session.updated_at,
        )),
        total_peer_duration: format_minutes(total),
    }
}
