use market::MarketDataError;
use thiserror::Error;
use tracing::error;

/// Error types for forecasting models and their input frames
#[derive(Error, Debug)]
pub enum ModelError {
    /// A required column is absent from the frame
    #[error("Missing column '{0}'")]
    MissingColumn(String),

    /// A required column holds nulls; models do not impute
    #[error("Column '{column}' contains {count} null values")]
    NullValues { column: String, count: usize },

    #[error("At least {required} observations are required to fit the model, got {observed}")]
    TooFewObservations { observed: usize, required: usize },

    /// All observations share one timestamp, time cannot be scaled
    #[error("History spans a single date")]
    DegenerateTimeRange,

    /// The regularized normal equations could not be solved
    #[error("Normal equations are singular")]
    Singular,

    #[error("Invalid model parameter: {0}")]
    InvalidParameter(String),

    /// Error from Polars DataFrame operations
    #[error("DataFrame error: {0}")]
    DataFrame(String),
}

impl From<polars::error::PolarsError> for ModelError {
    fn from(error: polars::error::PolarsError) -> Self {
        match error {
            polars::error::PolarsError::ColumnNotFound(_) => {
                let err = ModelError::MissingColumn(error.to_string());
                error!(?err, "DataFrame error: Column not found");
                err
            }
            polars::error::PolarsError::ShapeMismatch(_) => {
                let err = ModelError::DataFrame(format!("Shape mismatch: {}", error));
                error!(?err, "DataFrame error: Shape mismatch");
                err
            }
            polars::error::PolarsError::SchemaMismatch(_) => {
                let err = ModelError::DataFrame(format!("Schema mismatch: {}", error));
                error!(?err, "DataFrame error: Schema mismatch");
                err
            }
            _ => {
                let err = ModelError::DataFrame(error.to_string());
                error!(?err, "DataFrame error");
                err
            }
        }
    }
}

/// Errors surfaced by the forecast engine.
///
/// Only two kinds reach callers: not enough history, or anything else that
/// went wrong below the engine, wrapped with its cause.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error(
        "Insufficient data to produce a forecast: {observed} observations, at least {required} required"
    )]
    InsufficientData { observed: usize, required: usize },

    #[error("Forecast failed: {source}")]
    Failure {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ForecastError {
    pub fn failure(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ForecastError::Failure {
            source: source.into(),
        }
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, ForecastError::InsufficientData { .. })
    }
}

impl From<MarketDataError> for ForecastError {
    fn from(error: MarketDataError) -> Self {
        ForecastError::failure(error)
    }
}

impl From<ModelError> for ForecastError {
    fn from(error: ModelError) -> Self {
        ForecastError::failure(error)
    }
}

/// Type alias for Result with ForecastError
pub type Result<T> = std::result::Result<T, ForecastError>;
