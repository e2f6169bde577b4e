use chrono::{DateTime, Datelike, Duration, Utc};

/// Display bucket for a conversation start time, relative to `now`:
/// - "Today", "Yesterday", "Previous 7 days", "Previous 30 days"
/// - Month name for older dates in the same year: "March"
/// - Month and year before that: "March 2023"
pub fn time_group(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let today = now.date_naive().and_hms_opt(0, 0, 0).map(|t| t.and_utc()).unwrap_or(*now);

    if *timestamp >= today {
        "Today".to_string()
    } else if *timestamp >= today - Duration::days(1) {
        "Yesterday".to_string()
    } else if *timestamp >= today - Duration::days(7) {
        "Previous 7 days".to_string()
    } else if *timestamp >= today - Duration::days(30) {
        "Previous 30 days".to_string()
    } else if timestamp.year() == now.year() {
        timestamp.format("%B").to_string()
    } else {
        timestamp.format("%B %Y").to_string()
    }
}

/// "2024-03-01 14:05 UTC"
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_recent_buckets() {
        let now = now();
        assert_eq!(time_group(&(now - Duration::hours(2)), &now), "Today");
        assert_eq!(time_group(&Utc.with_ymd_and_hms(2024, 6, 14, 23, 0, 0).unwrap(), &now), "Yesterday");
        assert_eq!(time_group(&(now - Duration::days(5)), &now), "Previous 7 days");
        assert_eq!(time_group(&(now - Duration::days(20)), &now), "Previous 30 days");
    }

    #[test]
    fn test_month_buckets() {
        let now = now();
        assert_eq!(time_group(&Utc.with_ymd_and_hms(2024, 2, 3, 0, 0, 0).unwrap(), &now), "February");
        assert_eq!(
            time_group(&Utc.with_ymd_and_hms(2023, 11, 20, 0, 0, 0).unwrap(), &now),
            "November 2023"
        );
        assert_eq!(time_group(&DateTime::UNIX_EPOCH, &now), "January 1970");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(&now()), "2024-06-15 12:00 UTC");
    }
}
