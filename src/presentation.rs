//! Rendering of forecast results: table rows, the chart and the HTML page.

pub mod chart;
pub mod page;

use common::{format_display_date, ForecastResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use page::render_page;

/// One row of the prediction table, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ForecastTableRow {
    /// Day-month-year
    pub date: String,
    /// Predicted close with two decimals
    pub value: String,
}

/// Turns a forecast result into something a user can look at.
pub trait PresentationAdapter: Send + Sync + std::fmt::Debug {
    fn table(&self, result: &ForecastResult) -> Vec<ForecastTableRow>;

    /// Chart of the history and the predictions as an embeddable HTML fragment.
    fn chart(&self, result: &ForecastResult) -> String;
}

/// Default presenter: plain table rows and a plotly chart.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlotlyPresenter;

impl PresentationAdapter for PlotlyPresenter {
    fn table(&self, result: &ForecastResult) -> Vec<ForecastTableRow> {
        forecast_table(result)
    }

    fn chart(&self, result: &ForecastResult) -> String {
        chart::forecast_chart(result)
    }
}

pub fn forecast_table(result: &ForecastResult) -> Vec<ForecastTableRow> {
    result
        .predictions
        .iter()
        .map(|p| ForecastTableRow {
            date: format_display_date(p.date),
            value: format!("{:.2}", p.predicted_value),
        })
        .collect()
}
