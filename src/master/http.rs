//! Master HTTP API
//!
//! Pure translation between the wire protocol (spec §6) and the core
//! `MasterState` operations -- no business logic lives here.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::Error;
use crate::master::state::MasterState;
use crate::wire::{
    AckEntry, ErrorBody, MasterHealthResponse, MessagesResponse, SecondaryStatus, WriteRequest,
    WriteResponse,
};

pub fn router(state: Arc<MasterState>) -> Router {
    Router::new()
        .route("/messages", get(handle_list).post(handle_write))
        .route("/health", get(handle_health))
        .with_state(state)
}

async fn handle_list(State(state): State<Arc<MasterState>>) -> impl IntoResponse {
    Json(MessagesResponse {
        messages: state.list_messages().await,
    })
}

async fn handle_write(
    State(state): State<Arc<MasterState>>,
    Json(req): Json<WriteRequest>,
) -> axum::response::Response {
    let msg = match req.msg.as_str() {
        Some(s) => s.to_string(),
        None => {
            return bad_request("msg must be a string");
        }
    };

    let w = match parse_w(&req.w, state.total_nodes()) {
        Ok(w) => w,
        Err(e) => return bad_request(&e),
    };

    match state.write(msg, w).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(WriteResponse {
                messages: outcome.messages,
                acks: outcome
                    .acks
                    .into_iter()
                    .map(|secondary| AckEntry { secondary })
                    .collect(),
                w,
                duration_ms: outcome.duration.as_millis() as u64,
            }),
        )
            .into_response(),
        Err(Error::NoQuorum) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody::new("no quorum, master is read-only")),
        )
            .into_response(),
        Err(Error::WriteConcernTimeout { w }) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorBody::new(format!("Write concern w={w} not satisfied"))),
        )
            .into_response(),
        Err(Error::BadRequest(detail)) => bad_request(&detail),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(e.to_string())),
        )
            .into_response(),
    }
}

/// `w` defaults to full durability (`N`) when absent, per spec §4.3.
fn parse_w(w: &Option<serde_json::Value>, total_nodes: usize) -> std::result::Result<usize, String> {
    match w {
        None => Ok(total_nodes),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| "w must be an integer".to_string()),
        Some(_) => Err("w must be an integer".to_string()),
    }
}

fn bad_request(detail: &str) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(detail))).into_response()
}

async fn handle_health(State(state): State<Arc<MasterState>>) -> impl IntoResponse {
    let snapshot = state.health_snapshot().await;
    let secondary_statuses = snapshot
        .into_iter()
        .map(|(peer, s)| {
            (
                peer,
                SecondaryStatus {
                    status: s.state.to_string(),
                    last_heartbeat: s.last_heartbeat_ms_ago,
                    failures: s.consecutive_failures,
                    last_success: s.last_success_ms_ago,
                },
            )
        })
        .collect();

    Json(MasterHealthResponse {
        status: "ok",
        count: state.list_messages().await.len(),
        secondaries: state.config.secondaries.clone(),
        secondary_statuses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_w_defaults_to_total_nodes() {
        assert_eq!(parse_w(&None, 3).unwrap(), 3);
    }

    #[test]
    fn parse_w_accepts_explicit_integer() {
        assert_eq!(parse_w(&Some(serde_json::json!(1)), 3).unwrap(), 1);
    }

    #[test]
    fn parse_w_rejects_non_integer() {
        assert!(parse_w(&Some(serde_json::json!("two")), 3).is_err());
    }
}
