pub mod report;
pub mod trends;

use chrono::{DateTime, Utc};

/// round(part / total * 100), 0 for an empty set.
pub fn percent(part: i64, total: i64) -> i32 {
    if total == 0 {
        0
    } else {
        ((part as f64 / total as f64) * 100.0).round() as i32
    }
}

/// Elapsed hours between creation and completion, rounded to the nearest hour.
pub fn lead_time_hours(created_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> i64 {
    let millis = (completed_at - created_at).num_milliseconds();
    (millis as f64 / 3_600_000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(8, 10), 80);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn percent_of_empty_set_is_zero() {
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn lead_time_rounds_to_nearest_hour() {
        let created = Utc.timestamp_millis_opt(0).unwrap();
        let completed = Utc.timestamp_millis_opt(90 * 60 * 1000).unwrap();
        assert_eq!(lead_time_hours(created, completed), 2);

        let completed = Utc.timestamp_millis_opt(29 * 60 * 1000).unwrap();
        assert_eq!(lead_time_hours(created, completed), 0);

        let completed = Utc.timestamp_millis_opt(48 * 3_600_000).unwrap();
        assert_eq!(lead_time_hours(created, completed), 48);
    }
}
