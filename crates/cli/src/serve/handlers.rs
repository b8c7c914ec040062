//! HTTP route handlers for the form server.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::Deserialize;

use proof_form::FormError;

use super::json_error;
use super::page::INDEX_HTML;
use super::state::AppState;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET / -- the embedded single-page form front-end.
pub(crate) async fn handle_index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(INDEX_HTML.replace("{{title}}", &state.template_name))
}

/// GET /health
pub(crate) async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "template": state.template_name,
    });
    (StatusCode::OK, Json(response))
}

/// GET /form -- the current resolved view.
pub(crate) async fn handle_form(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let engine = state.engine.read().await;
    (StatusCode::OK, Json(engine.view()))
}

#[derive(Deserialize)]
pub(crate) struct SetValueRequest {
    name: String,
    value: String,
}

/// POST /values -- apply one field edit and return the re-resolved view.
///
/// Visibility and display values for every field are recomputed before
/// the response is produced, so the front-end swap is a single pass.
pub(crate) async fn handle_set_value(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetValueRequest>,
) -> impl IntoResponse {
    let mut engine = state.engine.write().await;
    match engine.set_value(&body.name, &body.value) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e @ FormError::UnknownParameter { .. }) => {
            json_error(StatusCode::NOT_FOUND, &e.to_string()).into_response()
        }
        Err(e) => json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    }
}

/// POST /bake -- validate completeness, then hand off to the generation
/// engine. Synchronous: the response returns when the bake finishes; the
/// page shows the waiting indicator.
pub(crate) async fn handle_bake(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let engine = state.engine.read().await;

    // The generation engine runs a subprocess; keep the worker thread
    // available to the runtime while it blocks.
    let result =
        tokio::task::block_in_place(|| engine.bake(&state.generator, state.target.clone()));

    match result {
        Ok(generated) => {
            let response = serde_json::json!({
                "status": "baked",
                "generated": generated,
            });
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(FormError::Validation { missing }) => {
            // One message per flagged field, for inline display.
            let messages: Vec<String> = missing
                .iter()
                .map(|name| format!("Parameter \"{}\" is missing", name))
                .collect();
            let response = serde_json::json!({
                "error": "missing required parameters",
                "missing": missing,
                "messages": messages,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(response)).into_response()
        }
        Err(e @ FormError::TemplateRender { .. }) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response()
        }
        Err(e) => json_error(StatusCode::BAD_GATEWAY, &e.to_string()).into_response(),
    }
}
