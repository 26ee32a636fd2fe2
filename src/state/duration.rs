//! Duration parsing and formatting
//!
//! Durations are plain second counts (`u32`). The three input fields are
//! clamped independently before being combined, so parsing never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_HOURS: u32 = 23;
pub const MAX_MINUTES: u32 = 59;
pub const MAX_SECONDS: u32 = 59;

/// Largest duration the fields can express (23:59:59)
pub const MAX_DURATION: u32 = MAX_HOURS * 3600 + MAX_MINUTES * 60 + MAX_SECONDS;

/// Hours/minutes/seconds input fields, always within their valid ranges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFields {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl TimeFields {
    /// Build fields from raw values, clamping each one to its range
    pub fn new(hours: i64, minutes: i64, seconds: i64) -> Self {
        Self {
            hours: clamp_field(hours, MAX_HOURS),
            minutes: clamp_field(minutes, MAX_MINUTES),
            seconds: clamp_field(seconds, MAX_SECONDS),
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn total_seconds(&self) -> u32 {
        parse(
            i64::from(self.hours),
            i64::from(self.minutes),
            i64::from(self.seconds),
        )
    }
}

fn clamp_field(value: i64, max: u32) -> u32 {
    value.clamp(0, i64::from(max)) as u32
}

/// Convert three raw field values into a duration in seconds
pub fn parse(hours: i64, minutes: i64, seconds: i64) -> u32 {
    clamp_field(hours, MAX_HOURS) * 3600
        + clamp_field(minutes, MAX_MINUTES) * 60
        + clamp_field(seconds, MAX_SECONDS)
}

/// Read the leading integer of a text field the way a form input would.
///
/// Leading whitespace and a single sign are accepted; parsing stops at the
/// first non-digit. Text without leading digits yields 0.
pub fn parse_field_text(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    if negative { -value } else { value }
}

/// Read a field from a JSON body. Numbers are truncated, strings go through
/// [`parse_field_text`], anything else counts as 0.
pub fn field_from_json(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_field_text(s),
        _ => 0,
    }
}

/// Format a duration as `H:MM:SS` when it has hours, `M:SS` otherwise
pub fn format_label(duration: u32) -> String {
    let hours = duration / 3600;
    let minutes = (duration % 3600) / 60;
    let seconds = duration % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Format a duration as a zero padded `HH:MM:SS` clock
pub fn format_clock(duration: u32) -> String {
    let hours = duration / 3600;
    let minutes = (duration % 3600) / 60;
    let seconds = duration % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Elapsed share of `total`, rounded to a whole percent. Zero when unset.
pub fn progress_percent(total: u32, remaining: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let elapsed = f64::from(total.saturating_sub(remaining));
    (elapsed / f64::from(total) * 100.0).round() as u8
}

/// Inverse of [`format_label`]. Two parts are `M:SS`, three are `H:MM:SS`.
pub fn parse_label(label: &str) -> Option<TimeFields> {
    let parts = label
        .trim()
        .split(':')
        .map(parse_label_part)
        .collect::<Option<Vec<i64>>>()?;

    match parts.as_slice() {
        [minutes, seconds] => Some(TimeFields::new(0, *minutes, *seconds)),
        [hours, minutes, seconds] => Some(TimeFields::new(*hours, *minutes, *seconds)),
        _ => None,
    }
}

fn parse_label_part(part: &str) -> Option<i64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_combines_fields() {
        assert_eq!(parse(0, 0, 5), 5);
        assert_eq!(parse(0, 2, 5), 125);
        assert_eq!(parse(1, 0, 0), 3600);
    }

    #[test]
    fn parse_clamps_each_field_independently() {
        assert_eq!(parse(99, 0, 0), 23 * 3600);
        assert_eq!(parse(0, 75, 0), 59 * 60);
        assert_eq!(parse(0, 0, 61), 59);
        assert_eq!(parse(-1, -20, -3), 0);
        assert_eq!(parse(i64::MAX, i64::MAX, i64::MAX), MAX_DURATION);
    }

    #[test]
    fn parse_output_stays_in_range() {
        for h in [-5, 0, 12, 23, 24, 1000] {
            for m in [-1, 0, 30, 59, 60] {
                for s in [-1, 0, 30, 59, 60] {
                    assert!(parse(h, m, s) <= MAX_DURATION);
                }
            }
        }
    }

    #[test]
    fn fields_total_goes_through_parse() {
        let fields = TimeFields::new(1, 75, -3);
        assert_eq!(fields.total_seconds(), parse(1, 75, -3));
        assert_eq!(fields.total_seconds(), 3600 + 59 * 60);
        assert_eq!(TimeFields::zero().total_seconds(), 0);
    }

    #[test]
    fn field_text_reads_leading_integer() {
        assert_eq!(parse_field_text("12"), 12);
        assert_eq!(parse_field_text("  7min"), 7);
        assert_eq!(parse_field_text("-4"), -4);
        assert_eq!(parse_field_text("abc"), 0);
        assert_eq!(parse_field_text(""), 0);
        assert_eq!(parse_field_text("-"), 0);
    }

    #[test]
    fn json_fields_accept_numbers_and_strings() {
        assert_eq!(field_from_json(&json!(5)), 5);
        assert_eq!(field_from_json(&json!(5.9)), 5);
        assert_eq!(field_from_json(&json!("08")), 8);
        assert_eq!(field_from_json(&json!("x")), 0);
        assert_eq!(field_from_json(&json!(null)), 0);
        assert_eq!(field_from_json(&json!([1])), 0);
    }

    #[test]
    fn label_uses_hours_only_when_present() {
        assert_eq!(format_label(5), "0:05");
        assert_eq!(format_label(125), "2:05");
        assert_eq!(format_label(1500), "25:00");
        assert_eq!(format_label(3661), "1:01:01");
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(3661), "01:01:01");
        assert_eq!(format_clock(59), "00:00:59");
        assert_eq!(format_clock(MAX_DURATION), "23:59:59");
    }

    #[test]
    fn progress_is_zero_without_total() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(200, 100), 50);
        assert_eq!(progress_percent(60, 0), 100);
    }

    #[test]
    fn label_round_trips_through_parser() {
        for duration in [1, 5, 59, 60, 125, 1500, 3599, 3600, 3661, MAX_DURATION] {
            let fields = parse_label(&format_label(duration)).expect("label parses");
            assert_eq!(fields.total_seconds(), duration);
        }
    }

    #[test]
    fn parse_label_splits_by_separator_count() {
        assert_eq!(parse_label("2:05"), Some(TimeFields::new(0, 2, 5)));
        assert_eq!(parse_label("1:02:03"), Some(TimeFields::new(1, 2, 3)));
    }

    #[test]
    fn parse_label_rejects_garbage() {
        assert_eq!(parse_label(""), None);
        assert_eq!(parse_label("5"), None);
        assert_eq!(parse_label("a:05"), None);
        assert_eq!(parse_label("1::05"), None);
        assert_eq!(parse_label("1:2:3:4"), None);
        assert_eq!(parse_label("-1:05"), None);
    }
}
