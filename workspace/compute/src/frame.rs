//! Conversions between price series and the two-column frames models consume.
//!
//! Model input is a DataFrame with `ds` (Date) and `y` (Float64). Model
//! output carries `ds`, `trend`, `yhat_lower`, `yhat_upper` and `yhat`.

use chrono::NaiveDate;
use common::{ForecastPoint, PriceSeries};
use polars::prelude::*;

use crate::calendar::next_business_days;
use crate::error::ModelError;

pub const DS: &str = "ds";
pub const Y: &str = "y";
pub const TREND: &str = "trend";
pub const YHAT: &str = "yhat";
pub const YHAT_LOWER: &str = "yhat_lower";
pub const YHAT_UPPER: &str = "yhat_upper";

/// `NaiveDate::num_days_from_ce` of 1970-01-01; polars stores dates as days since the epoch
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Reshapes a price series into the `(ds, y)` model input frame.
pub fn price_frame(series: &PriceSeries) -> Result<DataFrame, ModelError> {
    let dates: Vec<NaiveDate> = series.dates().collect();
    let closes: Vec<f64> = series.closes().collect();

    let df = DataFrame::new(vec![
        Series::new(DS.into(), dates).into(),
        Series::new(Y.into(), closes).into(),
    ])?;

    Ok(df)
}

/// Frame of dates to predict: every historical `ds` followed by `periods`
/// business days after the last one.
pub fn future_frame(history: &DataFrame, periods: usize) -> Result<DataFrame, ModelError> {
    let mut dates = date_column(history, DS)?;
    let last = dates
        .last()
        .copied()
        .ok_or(ModelError::TooFewObservations {
            observed: 0,
            required: 1,
        })?;
    dates.extend(next_business_days(last, periods));

    let df = DataFrame::new(vec![Series::new(DS.into(), dates).into()])?;
    Ok(df)
}

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, ModelError> {
    let column = df
        .column(name)
        .map_err(|_| ModelError::MissingColumn(name.to_string()))?;

    let nulls = column.null_count();
    if nulls > 0 {
        return Err(ModelError::NullValues {
            column: name.to_string(),
            count: nulls,
        });
    }
    Ok(column)
}

/// Reads a Date column. Nulls are rejected.
pub fn date_column(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>, ModelError> {
    let column = required_column(df, name)?;

    let mut dates = Vec::with_capacity(column.len());
    for i in 0..column.len() {
        let days = match column.get(i)? {
            AnyValue::Date(days) => days,
            other => {
                return Err(ModelError::DataFrame(format!(
                    "Expected a date in column '{}' at row {}, got {}",
                    name, i, other
                )));
            }
        };
        let date = NaiveDate::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE).ok_or_else(|| {
            ModelError::DataFrame(format!("Invalid date value at row {}: {}", i, days))
        })?;
        dates.push(date);
    }

    Ok(dates)
}

/// Reads a numeric column as `f64`. Nulls are rejected.
pub fn value_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, ModelError> {
    let column = required_column(df, name)?;

    let mut values = Vec::with_capacity(column.len());
    for i in 0..column.len() {
        let value = column.get(i)?.try_extract::<f64>().map_err(|e| {
            ModelError::DataFrame(format!(
                "Error extracting '{}' as f64 at row {}: {}",
                name, i, e
            ))
        })?;
        values.push(value);
    }

    Ok(values)
}

/// Turns the last `count` rows of a projection into forecast points.
pub fn tail_points(projection: &DataFrame, count: usize) -> Result<Vec<ForecastPoint>, ModelError> {
    let tail = projection.tail(Some(count));
    let dates = date_column(&tail, DS)?;
    let values = value_column(&tail, YHAT)?;

    Ok(dates
        .into_iter()
        .zip(values)
        .map(|(date, value)| ForecastPoint::new(date, value))
        .collect())
}
