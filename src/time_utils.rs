use crate::domain::market_data::Timestamp;
use chrono::{Duration, FixedOffset, NaiveDate, Offset, Utc};

/// Offset used for every label the chart draws. Out-of-range minutes fall
/// back to UTC.
pub fn display_offset(utc_offset_minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// Formats `timestamp` in the display zone with a `strftime` pattern.
pub fn format_in_zone(timestamp: Timestamp, offset: FixedOffset, pattern: &str) -> String {
    timestamp.value().with_timezone(&offset).format(pattern).to_string()
}

/// Calendar date of `timestamp` in the display zone
pub fn local_date(timestamp: Timestamp, offset: FixedOffset) -> NaiveDate {
    timestamp.value().with_timezone(&offset).date_naive()
}

/// Bars spaced a day or more apart get dates instead of clock times.
pub fn is_daily(bar_interval: Option<Duration>) -> bool {
    bar_interval.is_some_and(|gap| gap >= Duration::days(1))
}

/// Axis label for a bar open time: `HH:MM` intraday, `YYYY-MM-DD` for daily bars.
pub fn format_time_label(timestamp: Timestamp, offset: FixedOffset, daily: bool) -> String {
    let pattern = if daily { "%Y-%m-%d" } else { "%H:%M" };
    format_in_zone(timestamp, offset, pattern)
}

/// Day separator label, e.g. `05 Mar`
pub fn format_day_label(timestamp: Timestamp, offset: FixedOffset) -> String {
    format_in_zone(timestamp, offset, "%d %b")
}

/// Clock time with seconds, used by the selection info box
pub fn format_clock(timestamp: Timestamp, offset: FixedOffset) -> String {
    format_in_zone(timestamp, offset, "%H:%M:%S")
}
