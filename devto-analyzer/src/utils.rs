/// Text helpers for presentation output
pub mod text {
    /// Upper-case the first character and lower-case the rest
    pub fn capitalize(word: &str) -> String {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }
}

/// Day/hour bucketing helpers
pub mod time {
    use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

    pub const UNKNOWN_DAY: &str = "Unknown";

    /// Bucket order for day-of-week aggregates; the unknown sentinel sorts last.
    pub const DAY_ORDER: [&str; 8] = [
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday", UNKNOWN_DAY,
    ];

    pub fn day_name(weekday: Weekday) -> &'static str {
        match weekday {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    /// Day name and hour of a publish time, or the `Unknown`/0 sentinel.
    pub fn day_and_hour(published_at: Option<DateTime<Utc>>) -> (&'static str, u32) {
        match published_at {
            Some(ts) => (day_name(ts.weekday()), ts.hour()),
            None => (UNKNOWN_DAY, 0),
        }
    }

    pub fn day_position(day: &str) -> usize {
        DAY_ORDER.iter().position(|d| *d == day).unwrap_or(DAY_ORDER.len())
    }

    pub fn hour_label(hour: u32) -> String {
        format!("{:02}:00 UTC", hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn capitalize_lowers_the_tail() {
        assert_eq!(text::capitalize("rUST"), "Rust");
        assert_eq!(text::capitalize(""), "");
    }

    #[test]
    fn missing_timestamp_maps_to_sentinel() {
        assert_eq!(time::day_and_hour(None), ("Unknown", 0));
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        assert_eq!(time::day_and_hour(Some(ts)), ("Tuesday", 14));
    }

    #[test]
    fn unknown_day_sorts_last() {
        assert!(time::day_position("Sunday") < time::day_position(time::UNKNOWN_DAY));
        assert_eq!(time::day_position("Monday"), 0);
    }
}
