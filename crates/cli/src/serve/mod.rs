//! `proof run` -- HTTP form server over the resolution engine.
//!
//! The display runtime: serves the embedded form page plus the JSON API
//! it drives. One server hosts one form-filling interaction for one
//! template; the session lives in memory and dies with the process.
//!
//! Endpoints:
//! - GET  /         - Embedded form front-end
//! - GET  /health   - Server status
//! - GET  /form     - Current resolved form view
//! - POST /values   - Apply one field edit, returns the refreshed view
//! - POST /bake     - Validate completeness and invoke the generation engine
//!
//! All API responses use Content-Type: application/json.

mod handlers;
mod page;
mod state;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use proof_form::{BakeTarget, FormEngine};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use self::handlers::{
    handle_bake, handle_form, handle_health, handle_index, handle_not_found, handle_set_value,
};
use self::state::AppState;
use crate::baker::CookiecutterProcess;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// Start the form server on the given port. Runs until the process exits.
pub(crate) async fn start_server(
    port: u16,
    engine: FormEngine,
    target: BakeTarget,
    template_name: String,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        engine: RwLock::new(engine),
        generator: CookiecutterProcess::new(),
        target,
        template_name,
    });

    // Permissive CORS: the page and the API share an origin, but keep
    // local tooling able to poke the API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/form", get(handle_form))
        .route("/values", post(handle_set_value))
        .route("/bake", post(handle_bake))
        .fallback(handle_not_found)
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    if !quiet {
        eprintln!("proof form ready on http://127.0.0.1:{}/", port);
    }
    axum::serve(listener, app).await?;
    Ok(())
}
