//! Display axis for prediction curves: one label per 30-minute step.

use chrono::{DateTime, Duration, FixedOffset, Offset, TimeZone, Utc};

/// Minutes between consecutive samples of every curve.
pub const STEP_MINUTES: i64 = 30;

/// Event times are shown in the game's home zone (UTC+09:00).
const DISPLAY_OFFSET_SECS: i32 = 9 * 3600;

const LABEL_FORMAT: &str = "%m/%d %H:%M";

pub fn display_zone() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn step_duration() -> Duration {
    Duration::minutes(STEP_MINUTES)
}

/// Timestamps of the first `count` steps starting at `start_at`.
pub fn instants<Tz: TimeZone>(start_at: &DateTime<Tz>, count: usize) -> Vec<DateTime<FixedOffset>> {
    let zone = display_zone();
    let start = start_at.with_timezone(&zone);
    (0..count)
        .map(|i| start + Duration::minutes(STEP_MINUTES * i as i64))
        .collect()
}

/// Formatted labels for the first `count` steps starting at `start_at`.
pub fn build<Tz: TimeZone>(start_at: &DateTime<Tz>, count: usize) -> Vec<String> {
    instants(start_at, count)
        .iter()
        .map(|t| t.format(LABEL_FORMAT).to_string())
        .collect()
}

/// Label for one step, without building the whole axis.
pub fn label_at<Tz: TimeZone>(start_at: &DateTime<Tz>, step: usize) -> String {
    let t = start_at.with_timezone(&display_zone()) + Duration::minutes(STEP_MINUTES * step as i64);
    t.format(LABEL_FORMAT).to_string()
}
