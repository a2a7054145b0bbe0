use axum::{extract::State, http::StatusCode, response::Json};
use common::ApiResponse;
use tracing::{debug, instrument};

use crate::schemas::{AppState, ForecastApiResponse, ForecastFormRequest, WorkflowResponse};
use crate::workflow::{RequestWorkflow, WorkflowState};

/// Run the forecast workflow for a user
///
/// Fetches the recent closes of the configured symbol, fits the model and
/// returns the predictions with their formatted table.
#[utoipa::path(
    post,
    path = "/api/v1/forecast",
    tag = "forecast",
    request_body = ForecastFormRequest,
    responses(
        (status = 200, description = "Forecast produced", body = ApiResponse<WorkflowResponse>),
        (status = 422, description = "Name missing", body = ApiResponse<WorkflowResponse>),
        (status = 502, description = "Market data or model failure", body = ApiResponse<WorkflowResponse>)
    )
)]
#[instrument(skip(state))]
pub async fn run_forecast(
    State(state): State<AppState>,
    Json(request): Json<ForecastFormRequest>,
) -> (StatusCode, Json<ForecastApiResponse>) {
    let mut workflow = RequestWorkflow::new(&state.engine, state.presenter.as_ref());
    workflow.trigger(&request.name, state.now()).await;

    let outcome = workflow.into_state();
    let status = match &outcome {
        WorkflowState::Succeeded(_) => StatusCode::OK,
        WorkflowState::Failed { .. } => StatusCode::BAD_GATEWAY,
        WorkflowState::Idle { .. } | WorkflowState::Running => StatusCode::UNPROCESSABLE_ENTITY,
    };
    debug!("Forecast request finished as {} ({})", outcome.name(), status);

    let response = WorkflowResponse::from(outcome);
    let body = match response.message.clone() {
        _ if status == StatusCode::OK => ApiResponse::ok(response, "Forecast produced successfully"),
        Some(message) => ApiResponse::failed(response, message),
        None => ApiResponse::failed(response, "Forecast was not run"),
    };

    (status, Json(body))
}
