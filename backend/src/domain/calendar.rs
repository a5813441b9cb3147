//! Calendar helpers shared by streaks, badge conditions and weekly windows.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Length of a league or goal week.
pub const WEEK_DAYS: i64 = 7;

/// Calendar day of `at` in `offset`.
pub fn local_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Monday on or before `date`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use progression::domain::calendar::monday_of;
///
/// let sunday = NaiveDate::from_ymd_opt(2026, 3, 8).expect("valid date");
/// assert_eq!(monday_of(sunday), NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"));
/// ```
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Start of `date` in `offset`, as a UTC instant.
pub fn start_of_day(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match offset.from_local_datetime(&naive).single() {
        Some(local) => local.with_timezone(&Utc),
        // Fixed offsets always map one to one.
        None => Utc.from_utc_datetime(&naive),
    }
}

/// Half-open UTC window `[start, end)` of the Monday-based week containing
/// `at` in `offset`.
pub fn week_window(at: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let monday = monday_of(local_date(at, offset));
    let start = start_of_day(monday, offset);
    (start, start + Duration::days(WEEK_DAYS))
}

/// Monday 00:00 UTC of the league week containing `at`.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use progression::domain::calendar::utc_week_start;
///
/// let sunday = Utc.with_ymd_and_hms(2026, 3, 8, 23, 30, 0).single().expect("valid");
/// let monday = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).single().expect("valid");
/// assert_eq!(utc_week_start(sunday), monday);
/// ```
pub fn utc_week_start(at: DateTime<Utc>) -> DateTime<Utc> {
    monday_of(at.date_naive()).and_time(NaiveTime::MIN).and_utc()
}
