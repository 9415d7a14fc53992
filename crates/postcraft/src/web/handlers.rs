use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, Json};
use axum::Form;
use serde_json::{json, Value};
use tracing::warn;

use postcraft_core::{LoopError, LoopOutcome, RefinementRequest};

use super::pages::{self, FormValues, Notice};
use super::AppState;

const MISSING_TOPIC: &str = "Please enter a topic to craft your post!";

pub async fn index() -> Html<String> {
    Html(pages::render_index(&FormValues::default(), None))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn craft_form(
    State(state): State<AppState>,
    Form(values): Form<FormValues>,
) -> (StatusCode, Html<String>) {
    let request = RefinementRequest {
        topic: values.topic.clone(),
        mood: Some(values.mood.clone()),
        style_account: Some(values.style_account.clone()),
        max_iterations: state.max_iterations,
    };

    match state.runner.run(request).await {
        Ok(outcome) => (StatusCode::OK, Html(pages::render_result(&values, &outcome))),
        Err(e) => {
            let (status, notice) = match &e {
                LoopError::EmptyInput => (
                    StatusCode::BAD_REQUEST,
                    Notice::Warning(MISSING_TOPIC.to_string()),
                ),
                _ => {
                    warn!(error = %e, "craft request failed");
                    (error_status(&e), Notice::Error(e.to_string()))
                }
            };
            (status, Html(pages::render_index(&values, Some(&notice))))
        }
    }
}

pub async fn craft_json(
    State(state): State<AppState>,
    Json(request): Json<RefinementRequest>,
) -> Result<Json<LoopOutcome>, (StatusCode, String)> {
    if request.max_iterations > state.max_iterations {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "max_iterations must not exceed {} on this server",
                state.max_iterations
            ),
        ));
    }

    let outcome = state.runner.run(request).await.map_err(|e| {
        if !e.is_input_error() {
            warn!(error = %e, "craft request failed");
        }
        (error_status(&e), e.to_string())
    })?;

    Ok(Json(outcome))
}

fn error_status(error: &LoopError) -> StatusCode {
    if error.is_input_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    }
}
