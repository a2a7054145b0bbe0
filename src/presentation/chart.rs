use common::ForecastResult;
use plotly::common::{DashType, Line, Mode, Title};
use plotly::layout::themes::BuiltinTheme;
use plotly::layout::{Axis, Legend};
use plotly::{Layout, Plot, Scatter};

/// Id of the `<div>` the chart is drawn into.
pub const CHART_DIV_ID: &str = "forecast-chart";

/// plotly.js build matching the figure JSON emitted by the `plotly` crate.
pub const PLOTLY_JS_URL: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// Builds the figure: actual closes as a line, predictions as a dotted
/// green line with markers.
pub fn forecast_plot(result: &ForecastResult) -> Plot {
    let history_dates: Vec<String> = result.input_series.dates().map(|d| d.to_string()).collect();
    let history_closes: Vec<f64> = result.input_series.closes().collect();

    let forecast_dates: Vec<String> = result.predictions.iter().map(|p| p.date.to_string()).collect();
    let forecast_values: Vec<f64> = result.predictions.iter().map(|p| p.predicted_value).collect();

    let actual = Scatter::new(history_dates, history_closes)
        .mode(Mode::Lines)
        .name("Actual close");

    let forecast = Scatter::new(forecast_dates, forecast_values)
        .mode(Mode::LinesMarkers)
        .name("Forecast")
        .line(Line::new().color("green").width(2.0).dash(DashType::Dot));

    let layout = Layout::new()
        .title(Title::with_text(format!(
            "Closing price forecast for the next {} days - {}",
            result.predictions.len(),
            result.symbol
        )))
        .x_axis(Axis::new().title(Title::with_text("Date")))
        .y_axis(Axis::new().title(Title::with_text("Closing price (USD)")))
        .legend(Legend::new().title(Title::with_text("Legend")))
        .template(BuiltinTheme::PlotlyWhite.build())
        .height(450);

    let mut plot = Plot::new();
    plot.add_trace(actual);
    plot.add_trace(forecast);
    plot.set_layout(layout);
    plot
}

/// Inline HTML fragment of the chart. Needs plotly.js on the page.
pub fn forecast_chart(result: &ForecastResult) -> String {
    forecast_plot(result).to_inline_html(Some(CHART_DIV_ID))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::{ForecastPoint, PricePoint, PriceSeries};

    fn result() -> ForecastResult {
        let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        ForecastResult {
            symbol: "BZ=F".to_string(),
            input_series: PriceSeries::new(vec![
                PricePoint::new(d(13), 82.6),
                PricePoint::new(d(14), 82.1),
            ]),
            predictions: vec![
                ForecastPoint::new(d(17), 82.3),
                ForecastPoint::new(d(18), 82.4),
            ],
        }
    }

    #[test]
    fn test_forecast_chart_contains_both_traces() {
        let html = forecast_chart(&result());

        assert!(html.contains(CHART_DIV_ID));
        assert!(html.contains("Actual close"));
        assert!(html.contains("Forecast"));
        assert!(html.contains("\"dot\""));
        assert!(html.contains("Closing price forecast for the next 2 days - BZ=F"));
        assert!(html.contains("2024-06-17"));
    }

    #[test]
    fn test_forecast_plot_serializes() {
        let json = forecast_plot(&result()).to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["data"][1]["line"]["color"], "green");
        assert_eq!(value["layout"]["legend"]["title"]["text"], "Legend");
        assert!(value["layout"]["template"]["layout"].is_object());
    }
}
