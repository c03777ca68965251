use chrono::{Datelike, Days, Months, NaiveDate};

const LONG_DATE_FORMAT: &str = "%B %-d, %Y";

/// Date of the charge following one made on `from`: one calendar month later,
/// whatever billing period was selected.
pub fn next_billing_date(from: NaiveDate) -> Option<NaiveDate> {
    add_months_overflowing(from, 1)
}

/// Keeps the day-of-month and lets days past the end of the target month carry
/// into the next one, so January 31 + 1 month is March 3 (March 2 in leap years).
fn add_months_overflowing(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(months))?
        .checked_add_days(Days::new(u64::from(date.day0())))
}

/// en-US long form, e.g. `February 5, 2025`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format(LONG_DATE_FORMAT).to_string()
}
