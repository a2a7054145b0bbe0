use chrono::{Datelike, NaiveDate, Weekday};

/// Monday to Friday. Exchange holidays are not modelled.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first `count` business days strictly after `after`.
pub fn next_business_days(after: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut current = after;
    while days.len() < count {
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
        if is_business_day(current) {
            days.push(current);
        }
    }
    days
}

/// Business days in `[start, end]`.
pub fn business_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d))
        .collect()
}
