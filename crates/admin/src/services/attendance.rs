//! Clock-in classification in the shop's local time.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};

use laptop_shop_core::AttendanceStatus;

/// The local work date and status for a clock-in at `at`.
///
/// Clocking in after `opens_at` (strictly) is late.
#[must_use]
pub fn classify_clock_in(
    at: DateTime<Utc>,
    offset: FixedOffset,
    opens_at: NaiveTime,
) -> (NaiveDate, AttendanceStatus) {
    let local = at.with_timezone(&offset);
    let status = if local.time() > opens_at {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    };
    (local.date_naive(), status)
}

/// Whether a manually recorded day may use `status`.
///
/// Present and late days come from clocking in.
#[must_use]
pub const fn is_manual_status(status: AttendanceStatus) -> bool {
    matches!(status, AttendanceStatus::Absent | AttendanceStatus::Leave)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn wib() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn test_on_time_and_late() {
        // 08:59 and 09:00 local are on time, 09:01 is late
        let early = Utc.with_ymd_and_hms(2025, 6, 2, 1, 59, 0).unwrap();
        let exact = Utc.with_ymd_and_hms(2025, 6, 2, 2, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 6, 2, 2, 1, 0).unwrap();
        assert_eq!(classify_clock_in(early, wib(), nine()).1, AttendanceStatus::Present);
        assert_eq!(classify_clock_in(exact, wib(), nine()).1, AttendanceStatus::Present);
        assert_eq!(classify_clock_in(late, wib(), nine()).1, AttendanceStatus::Late);
    }

    #[test]
    fn test_work_date_is_local() {
        // 23:30 UTC on the 1st is 06:30 on the 2nd in UTC+7
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 23, 30, 0).unwrap();
        let (date, status) = classify_clock_in(at, wib(), nine());
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(status, AttendanceStatus::Present);
    }

    #[test]
    fn test_manual_statuses() {
        assert!(is_manual_status(AttendanceStatus::Absent));
        assert!(is_manual_status(AttendanceStatus::Leave));
        assert!(!is_manual_status(AttendanceStatus::Present));
        assert!(!is_manual_status(AttendanceStatus::Late));
    }
}
