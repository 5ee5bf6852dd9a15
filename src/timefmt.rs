//! Calendar-aware time differences and humanized formatting.
//!
//! The breakdown works on calendar fields the way a wall calendar does:
//! whole months are counted by advancing the earlier datetime month by
//! month (clamping the day, so Jan 31 + 1 month is the last day of
//! February), and the remainder is split into days, hours, minutes, and
//! seconds. Timezone-database lookup stays with the caller: the API takes
//! datetimes that are already in the zone the caller cares about.

use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

/// Calendar-unit breakdown of the span between two datetimes. Every
/// component is non-negative; `inverted` records which side was later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CalendarDelta {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    /// True when the first datetime is later than the second.
    pub inverted: bool,
}

impl CalendarDelta {
    pub fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
    }
}

/// Breaks the span between `from` and `to` into calendar units, using the
/// local clock readings of the supplied datetimes.
pub fn between<Tz: TimeZone>(from: &DateTime<Tz>, to: &DateTime<Tz>) -> CalendarDelta {
    naive_between(from.naive_local(), to.naive_local())
}

fn naive_between(a: NaiveDateTime, b: NaiveDateTime) -> CalendarDelta {
    let (start, end, inverted) = if a <= b { (a, b, false) } else { (b, a, true) };

    let mut months =
        (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    if months > 0 && add_months_clamped(start, months) > end {
        months -= 1;
    }
    let anchor = add_months_clamped(start, months);

    let mut remainder = end.signed_duration_since(anchor).num_seconds();
    let days = remainder / 86_400;
    remainder %= 86_400;
    let hours = remainder / 3_600;
    remainder %= 3_600;
    let minutes = remainder / 60;
    let seconds = remainder % 60;

    CalendarDelta {
        years: (months / 12) as u32,
        months: (months % 12) as u32,
        days: days as u32,
        hours: hours as u32,
        minutes: minutes as u32,
        seconds: seconds as u32,
        inverted,
    }
}

fn add_months_clamped(datetime: NaiveDateTime, months: i32) -> NaiveDateTime {
    datetime
        .checked_add_months(Months::new(months as u32))
        .unwrap_or(datetime)
}

/// Renders the `max_units` most significant non-zero units of a delta,
/// e.g. `"2 years, 3 months"`. A zero delta renders as `"just now"`.
pub fn humanize(delta: &CalendarDelta, max_units: usize) -> String {
    let parts: [(u32, &str); 6] = [
        (delta.years, "year"),
        (delta.months, "month"),
        (delta.days, "day"),
        (delta.hours, "hour"),
        (delta.minutes, "minute"),
        (delta.seconds, "second"),
    ];
    let mut rendered = Vec::new();
    for (count, unit) in parts {
        if rendered.len() == max_units {
            break;
        }
        if count == 0 {
            continue;
        }
        let plural = if count == 1 { "" } else { "s" };
        rendered.push(format!("{count} {unit}{plural}"));
    }
    if rendered.is_empty() {
        return "just now".to_string();
    }
    rendered.join(", ")
}

/// Human-readable age of `then` relative to `now`: `"3 hours, 12 minutes
/// ago"`, `"2 days from now"`, or `"just now"`.
pub fn age_of<Tz: TimeZone>(then: &DateTime<Tz>, now: &DateTime<Tz>) -> String {
    let delta = between(then, now);
    if delta.is_zero() {
        return "just now".to_string();
    }
    let body = humanize(&delta, 2);
    if delta.inverted {
        format!("{body} from now")
    } else {
        format!("{body} ago")
    }
}

/// Renders a UTC instant in a fixed offset with a chrono format string.
pub fn format_offset(instant: &DateTime<Utc>, offset: FixedOffset, format: &str) -> String {
    instant.with_timezone(&offset).format(format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_between_simple() {
        let delta = between(&utc(2024, 3, 10, 8, 0, 0), &utc(2024, 3, 12, 10, 30, 5));
        assert_eq!(
            delta,
            CalendarDelta {
                days: 2,
                hours: 2,
                minutes: 30,
                seconds: 5,
                ..CalendarDelta::default()
            }
        );
    }

    #[test]
    fn test_between_borrows_across_month_ends() {
        // Jan 31 + 1 month clamps to Feb 29 (leap year), leaving one day.
        let delta = between(&utc(2024, 1, 31, 0, 0, 0), &utc(2024, 3, 1, 0, 0, 0));
        assert_eq!(delta.years, 0);
        assert_eq!(delta.months, 1);
        assert_eq!(delta.days, 1);
        assert!(!delta.inverted);
    }

    #[test]
    fn test_between_leap_day_anniversary() {
        let delta = between(&utc(2020, 2, 29, 0, 0, 0), &utc(2021, 3, 1, 0, 0, 0));
        assert_eq!(delta.years, 1);
        assert_eq!(delta.months, 0);
        assert_eq!(delta.days, 1);
    }

    #[test]
    fn test_between_inverted() {
        let delta = between(&utc(2024, 5, 2, 0, 0, 0), &utc(2024, 5, 1, 0, 0, 0));
        assert_eq!(delta.days, 1);
        assert!(delta.inverted);
    }

    #[test]
    fn test_between_equal_instants() {
        let now = utc(2024, 6, 1, 12, 0, 0);
        assert!(between(&now, &now).is_zero());
    }

    #[test]
    fn test_humanize() {
        let delta = CalendarDelta {
            years: 2,
            months: 3,
            days: 4,
            ..CalendarDelta::default()
        };
        assert_eq!(humanize(&delta, 2), "2 years, 3 months");
        assert_eq!(humanize(&delta, 6), "2 years, 3 months, 4 days");

        let singular = CalendarDelta {
            years: 1,
            ..CalendarDelta::default()
        };
        assert_eq!(humanize(&singular, 2), "1 year");
        assert_eq!(humanize(&CalendarDelta::default(), 2), "just now");
    }

    #[test]
    fn test_humanize_skips_zero_units() {
        let delta = CalendarDelta {
            days: 1,
            minutes: 5,
            ..CalendarDelta::default()
        };
        assert_eq!(humanize(&delta, 2), "1 day, 5 minutes");
    }

    #[test]
    fn test_age_of() {
        let now = utc(2024, 6, 1, 12, 0, 0);
        assert_eq!(age_of(&utc(2024, 6, 1, 10, 30, 0), &now), "1 hour, 30 minutes ago");
        assert_eq!(age_of(&utc(2024, 6, 3, 12, 0, 0), &now), "2 days from now");
        assert_eq!(age_of(&now, &now), "just now");
    }

    #[test]
    fn test_format_offset() {
        let instant = utc(2024, 1, 15, 12, 0, 0);
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert_eq!(
            format_offset(&instant, ist, "%Y-%m-%d %H:%M"),
            "2024-01-15 17:30"
        );
    }
}
