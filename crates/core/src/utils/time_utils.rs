use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// Default timezone for club business dates.
/// Clubs keep their books in local time; this converts UTC instants to the
/// calendar date a ledger entry is booked on.
pub const DEFAULT_CLUB_TZ: Tz = chrono_tz::Africa::Kampala;

/// Converts a UTC instant to a business date in the given timezone.
pub fn business_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Today's business date in the given timezone.
pub fn business_date_today(tz: Tz) -> NaiveDate {
    business_date_from_utc(Utc::now(), tz)
}

/// Sortable key for a club-month (`year * 100 + month`).
pub fn period_key(year: i32, month: u32) -> i64 {
    i64::from(year) * 100 + i64::from(month)
}

/// `YYYY-MM` label for a club-month.
pub fn year_month_label(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// First and last calendar day of a month, or `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next_first.pred_opt()?;
    debug_assert_eq!(last.month(), month);
    Some((first, last))
}
