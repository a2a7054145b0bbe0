use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::series::PriceSeries;

/// Parameters of a single forecast invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ForecastRequest {
    /// Ticker identifier, e.g. `BZ=F`
    pub symbol: String,
    /// Calendar days of history fetched before `now`
    pub lookback_days: u32,
    /// Business days predicted after the last observation
    pub horizon_days: u32,
}

/// Predicted value for one future business day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Point estimate of the closing price
    pub predicted_value: f64,
}

impl ForecastPoint {
    pub fn new(date: NaiveDate, predicted_value: f64) -> Self {
        Self {
            date,
            predicted_value,
        }
    }
}

/// Output of one forecast run: the history it was fitted on and the
/// predictions, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastResult {
    pub symbol: String,
    pub input_series: PriceSeries,
    pub predictions: Vec<ForecastPoint>,
}
