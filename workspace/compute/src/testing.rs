//! Fixtures shared by the unit tests here and the web layer tests.

use chrono::{DateTime, NaiveDate, Utc};
use common::{PricePoint, PriceSeries};

use crate::calendar::business_days_between;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

pub fn utc_noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    date(year, month, day)
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
        .and_utc()
}

/// One close per business day in `[start, end]`, drifting by `step` per day
/// with a small deterministic wobble.
pub fn business_day_series(start: NaiveDate, end: NaiveDate, base: f64, step: f64) -> PriceSeries {
    business_days_between(start, end)
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            let wobble = if i % 3 == 0 { 0.25 } else { -0.1 };
            PricePoint::new(d, base + step * i as f64 + wobble)
        })
        .collect()
}
