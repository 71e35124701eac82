use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{api, config::ServerConfig, state::AppState, ws};

/// Build the application router
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let routes = Router::new()
        .route("/tasks", get(api::list_tasks).post(api::create_task))
        .route("/tasks/{id}", put(api::update_task))
        .route("/ws", get(ws::ws_handler));

    with_middleware(routes, config).with_state(state)
}

fn with_middleware(
    routes: Router<Arc<AppState>>,
    config: &ServerConfig,
) -> Router<Arc<AppState>> {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(config.cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// A panicking handler answers 500 instead of dropping the connection
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
        .into_response()
}
