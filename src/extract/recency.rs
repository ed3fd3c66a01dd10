//! The trailing recency window.
//!
//! A month is always 30 days here; calendar months are not consulted.

use chrono::{Duration, NaiveDate, NaiveDateTime};

pub const DAYS_PER_MONTH: i64 = 30;

/// First calendar day inside the window, or `None` when the window reaches
/// past the earliest representable date.
pub fn window_start(months: u32, now: NaiveDateTime) -> Option<NaiveDate> {
    let span = Duration::try_days(DAYS_PER_MONTH * i64::from(months))?;
    now.checked_sub_signed(span).map(|cutoff| cutoff.date())
}

/// Accept `date` when it is on or after the window start.
///
/// The comparison is made on calendar days, so `months == 0` keeps articles
/// dated today. Unknown dates are always rejected.
pub fn is_within_window(date: Option<NaiveDate>, months: u32, now: NaiveDateTime) -> bool {
    let Some(date) = date else {
        return false;
    };
    match window_start(months, now) {
        Some(start) => date >= start,
        None => true,
    }
}
