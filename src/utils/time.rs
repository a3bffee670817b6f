use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Wall-clock time; out-of-range input collapses to midnight.
pub fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Date-only input is pinned to midday UTC so that no viewer timezone
/// moves it onto the neighbouring day.
pub fn midday(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(clock(12, 0)))
}

/// `9:00 AM`, `12:00 AM`, `4:00 PM`
pub fn display_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Accepts `9:00 AM`, `9:00am`, `17:00` and `09:00`.
pub fn parse_clock(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    let upper = input.to_uppercase();
    NaiveTime::parse_from_str(&upper, "%I:%M %p")
        .or_else(|_| NaiveTime::parse_from_str(&upper, "%I:%M%p"))
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midday_keeps_calendar_day() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 21).unwrap();
        let instant = midday(date);
        assert_eq!(instant.to_rfc3339(), "2025-12-21T12:00:00+00:00");
        assert_eq!(instant.date_naive(), date);
    }

    #[test]
    fn parses_both_clock_styles() {
        assert_eq!(parse_clock("9:00 AM"), Some(clock(9, 0)));
        assert_eq!(parse_clock("11:00 pm"), Some(clock(23, 0)));
        assert_eq!(parse_clock("5:30PM"), Some(clock(17, 30)));
        assert_eq!(parse_clock("09:00"), Some(clock(9, 0)));
        assert_eq!(parse_clock("noon"), None);
    }

    #[test]
    fn displays_twelve_hour_clock() {
        assert_eq!(display_time(clock(0, 0)), "12:00 AM");
        assert_eq!(display_time(clock(17, 0)), "5:00 PM");
    }
}
