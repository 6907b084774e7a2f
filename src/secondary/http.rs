//! Secondary HTTP API

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::config::SecondaryConfig;
use crate::secondary::apply::{ApplyEngine, ApplyOutcome};
use crate::wire::{ErrorBody, MessagesResponse, ReplicateRequest, ReplicateResponse, SecondaryHealthResponse};

pub struct SecondaryState {
    pub config: SecondaryConfig,
    pub engine: ApplyEngine,
}

pub fn router(state: Arc<SecondaryState>) -> Router {
    Router::new()
        .route("/messages", get(handle_list))
        .route("/replicate", post(handle_replicate))
        .route("/health", get(handle_health))
        .with_state(state)
}

async fn handle_list(State(state): State<Arc<SecondaryState>>) -> impl IntoResponse {
    Json(MessagesResponse {
        messages: state.engine.list().await,
    })
}

async fn handle_replicate(
    State(state): State<Arc<SecondaryState>>,
    Json(req): Json<ReplicateRequest>,
) -> axum::response::Response {
    let msg = match req.msg.as_str() {
        Some(s) => s.to_string(),
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("msg must be a string")),
            )
                .into_response();
        }
    };

    match state.engine.replicate(req.seq, msg).await {
        Ok(outcome) => Json(ReplicateResponse {
            status: "ok",
            seq: req.seq as u64,
            duplicate: (outcome == ApplyOutcome::Duplicate).then_some(true),
        })
        .into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ErrorBody::new(e.to_string()))).into_response(),
    }
}

async fn handle_health(State(state): State<Arc<SecondaryState>>) -> impl IntoResponse {
    Json(SecondaryHealthResponse {
        status: "ok",
        count: state.engine.len().await,
        delay_ms: state.config.delay_ms,
    })
}
