use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use common::format_display_date;
use tracing::{debug, info};

use crate::config::{initialize_app_state, AppConfig};
use crate::presentation::forecast_table;

/// Runs one forecast outside the web server and prints the table.
pub async fn forecast(
    config_path: Option<&Path>,
    symbol: Option<String>,
    now: Option<NaiveDate>,
) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let state = initialize_app_state(&config)?;

    let symbol = symbol.unwrap_or_else(|| config.forecast.symbol.clone());
    let now = match now {
        // Noon keeps the date unchanged in any exchange timezone
        Some(date) => (date.and_time(NaiveTime::MIN) + Duration::hours(12)).and_utc(),
        None => Utc::now(),
    };
    debug!("Forecasting {} as of {}", symbol, now);

    let result = state
        .engine
        .forecast(&symbol, now)
        .await
        .with_context(|| format!("Forecast of {} failed", symbol))?;
    info!("Forecast of {} complete", symbol);

    if let Some(range) = result.input_series.date_range() {
        println!(
            "Historical data used: {} to {} ({} closes)",
            format_display_date(range.start_date),
            format_display_date(range.end_date),
            result.input_series.len()
        );
    }
    println!("{:<12} {:>12}", "Date", result.symbol);
    for row in forecast_table(&result) {
        println!("{:<12} {:>12}", row.date, row.value);
    }

    Ok(())
}
