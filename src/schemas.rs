use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{ApiResponse, DateRange, ForecastPoint, ForecastResult, PricePoint, PriceSeries};
use compute::ForecastEngine;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::presentation::{ForecastTableRow, PresentationAdapter};
use crate::workflow::WorkflowState;

/// Source of the current time for a request.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Forecast engine; immutable once built
    pub engine: Arc<ForecastEngine>,
    /// Renders tables and charts
    pub presenter: Arc<dyn PresentationAdapter>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(engine: ForecastEngine, presenter: Arc<dyn PresentationAdapter>) -> Self {
        Self {
            engine: Arc::new(engine),
            presenter,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine", &self.engine)
            .field("presenter", &self.presenter)
            .finish_non_exhaustive()
    }
}

/// Form submitted by the page and the JSON endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ForecastFormRequest {
    /// Name of the user requesting the forecast
    #[serde(default)]
    pub name: String,
}

/// Outcome of one workflow run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkflowResponse {
    /// Final workflow state: idle, succeeded or failed
    pub state: String,
    /// Warning or error shown to the user
    pub message: Option<String>,
    pub greeting: Option<String>,
    /// Range of the historical closes the model was fitted on
    pub historical_range: Option<DateRange>,
    /// Formatted prediction table
    pub table: Vec<ForecastTableRow>,
    pub forecast: Option<ForecastResult>,
}

impl From<WorkflowState> for WorkflowResponse {
    fn from(state: WorkflowState) -> Self {
        let name = state.name().to_string();
        let message = state.message().map(str::to_string);
        match state {
            WorkflowState::Succeeded(view) => Self {
                state: name,
                message,
                greeting: Some(view.greeting),
                historical_range: view.result.input_series.date_range(),
                table: view.rows,
                forecast: Some(view.result),
            },
            _ => Self {
                state: name,
                message,
                greeting: None,
                historical_range: None,
                table: Vec::new(),
                forecast: None,
            },
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Market data provider in use
    pub provider: String,
    /// Symbol forecast by the form
    pub symbol: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::forecast::run_forecast,
    ),
    components(
        schemas(
            HealthResponse,
            ForecastFormRequest,
            WorkflowResponse,
            ForecastTableRow,
            ForecastResult,
            ForecastPoint,
            PriceSeries,
            PricePoint,
            DateRange,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "forecast", description = "Commodity price forecast endpoints"),
    ),
    info(
        title = "pricecast API",
        description = "Short-horizon commodity closing price forecasts",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

/// Envelope returned by the forecast endpoint
pub type ForecastApiResponse = ApiResponse<WorkflowResponse>;
