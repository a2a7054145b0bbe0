//! Common types shared between the forecast core, the market data providers
//! and the web layer. Everything here is plain data: no I/O, no model code.

mod display;
mod forecast;
mod series;

pub use display::{format_display_date, parse_display_date, DISPLAY_DATE_FORMAT};
pub use forecast::{ForecastPoint, ForecastRequest, ForecastResult};
pub use series::{DateRange, PricePoint, PriceSeries};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper used by the JSON endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }

    pub fn failed(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: false,
        }
    }
}
