use axum::{extract::State, response::Html, Form};
use tracing::instrument;

use crate::presentation::page::PageContext;
use crate::presentation::render_page;
use crate::schemas::{AppState, ForecastFormRequest};
use crate::workflow::{RequestWorkflow, WorkflowState};

/// Empty form
#[instrument(skip(state))]
pub async fn show_form(State(state): State<AppState>) -> Html<String> {
    let context = PageContext {
        settings: state.engine.settings(),
        name: "",
    };
    Html(render_page(context, &WorkflowState::default()))
}

/// Form submission: runs the workflow and renders its outcome
#[instrument(skip(state))]
pub async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<ForecastFormRequest>,
) -> Html<String> {
    let mut workflow = RequestWorkflow::new(&state.engine, state.presenter.as_ref());
    let outcome = workflow.trigger(&form.name, state.now()).await;

    let context = PageContext {
        settings: state.engine.settings(),
        name: &form.name,
    };
    Html(render_page(context, outcome))
}
