//! Decision-point HTTP surface
//!
//! The router here backs the `authzd-server` sidecar binary and the
//! local/remote equivalence tests: a remote-mode engine in one process
//! points its `backend-url` at this router in another.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::engine::{BackendHealth, Engine};
use crate::types::DecideInput;

/// Wire request: `{"input": Input}`
#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub input: DecideInput,
}

/// Wire response: `{"result": bool, "reasons": [...]}`
#[derive(Debug, Serialize)]
pub struct DecideResponse {
    pub result: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

/// Build the decision-point router
pub fn router(engine: Arc<Engine>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/decide", post(decide))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(engine)
}

/// POST /v1/decide
async fn decide(
    State(engine): State<Arc<Engine>>,
    Json(request): Json<DecideRequest>,
) -> Json<DecideResponse> {
    let decision = engine.decide(&request.input).await;

    info!(
        user = %request.input.user.user_id,
        action = %request.input.action,
        allowed = decision.allowed,
        "decision point verdict"
    );

    Json(DecideResponse {
        result: decision.allowed,
        reasons: decision.reasons,
    })
}

/// GET /health
async fn health(State(engine): State<Arc<Engine>>) -> Json<BackendHealth> {
    Json(engine.health())
}
