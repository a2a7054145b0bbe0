//! Per-request state machine between the form and the forecast engine.
//!
//! `Idle -> Running -> {Succeeded, Failed}`. A trigger always restarts from
//! `Idle`, so a finished workflow can be run again.

use chrono::{DateTime, Utc};
use common::{format_display_date, ForecastResult};
use compute::ForecastEngine;
use tracing::{debug, error, info, instrument, warn};

use crate::presentation::{ForecastTableRow, PresentationAdapter};

pub const MISSING_NAME_WARNING: &str = "Please enter your name to continue.";
const FAILURE_PREFIX: &str = "An error occurred while processing the data";

/// What the user sees after a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastView {
    pub greeting: String,
    /// First historical date, day-month-year
    pub history_start: String,
    /// Last historical date, day-month-year
    pub history_end: String,
    pub rows: Vec<ForecastTableRow>,
    pub chart_html: String,
    pub result: ForecastResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Idle { warning: Option<String> },
    Running,
    Succeeded(ForecastView),
    Failed { message: String },
}

impl Default for WorkflowState {
    fn default() -> Self {
        WorkflowState::Idle { warning: None }
    }
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle { .. } => "idle",
            WorkflowState::Running => "running",
            WorkflowState::Succeeded(_) => "succeeded",
            WorkflowState::Failed { .. } => "failed",
        }
    }

    /// The single warning or error message of this state, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            WorkflowState::Idle { warning } => warning.as_deref(),
            WorkflowState::Failed { message } => Some(message),
            WorkflowState::Running | WorkflowState::Succeeded(_) => None,
        }
    }
}

/// Drives one user action through the engine and the presenter.
///
/// Borrows its collaborators; the only thing it owns is its current state.
#[derive(Debug)]
pub struct RequestWorkflow<'a> {
    engine: &'a ForecastEngine,
    presenter: &'a dyn PresentationAdapter,
    state: WorkflowState,
}

impl<'a> RequestWorkflow<'a> {
    pub fn new(engine: &'a ForecastEngine, presenter: &'a dyn PresentationAdapter) -> Self {
        Self {
            engine,
            presenter,
            state: WorkflowState::default(),
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn into_state(self) -> WorkflowState {
        self.state
    }

    /// Runs the forecast for `user_name` as of `now`.
    ///
    /// A blank name leaves the workflow idle with a warning and never reaches
    /// the engine. Engine errors end in `Failed` with one message.
    #[instrument(skip(self))]
    pub async fn trigger(&mut self, user_name: &str, now: DateTime<Utc>) -> &WorkflowState {
        self.state = WorkflowState::default();

        let name = user_name.trim();
        if name.is_empty() {
            warn!("Forecast requested without a name");
            self.state = WorkflowState::Idle {
                warning: Some(MISSING_NAME_WARNING.to_string()),
            };
            return &self.state;
        }

        self.state = WorkflowState::Running;
        let symbol = self.engine.settings().symbol.clone();
        debug!("Running forecast of {} for {}", symbol, name);

        self.state = match self.engine.forecast(&symbol, now).await {
            Ok(result) => {
                info!("Forecast of {} ready for {}", symbol, name);
                WorkflowState::Succeeded(self.present(name, result))
            }
            Err(e) => {
                if e.is_insufficient_data() {
                    warn!("Not enough history to forecast {}: {}", symbol, e);
                } else {
                    error!("Forecast of {} failed: {}", symbol, e);
                }
                WorkflowState::Failed {
                    message: format!("{}: {}", FAILURE_PREFIX, e),
                }
            }
        };

        &self.state
    }

    fn present(&self, name: &str, result: ForecastResult) -> ForecastView {
        let range = result.input_series.date_range();
        let (history_start, history_end) = range
            .map(|r| (format_display_date(r.start_date), format_display_date(r.end_date)))
            .unwrap_or_default();

        ForecastView {
            greeting: format!("Hello, {}! Here is the forecast for {}:", name, result.symbol),
            history_start,
            history_end,
            rows: self.presenter.table(&result),
            chart_html: self.presenter.chart(&result),
            result,
        }
    }
}
