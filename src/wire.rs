//! Wire types
//!
//! JSON request/response bodies for the HTTP surfaces described in spec §6.
//! Kept as plain, explicitly validated structs rather than duck-typed maps.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `POST /messages` request body (master).
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub msg: serde_json::Value,
    #[serde(default)]
    pub w: Option<serde_json::Value>,
}

/// `POST /messages` success response (master).
#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub messages: Vec<String>,
    pub acks: Vec<AckEntry>,
    pub w: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize, Clone)]
pub struct AckEntry {
    pub secondary: String,
}

/// `GET /messages` response (both master and secondary).
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<String>,
}

/// `GET /health` response (master).
#[derive(Debug, Serialize)]
pub struct MasterHealthResponse {
    pub status: &'static str,
    pub count: usize,
    pub secondaries: Vec<String>,
    pub secondary_statuses: HashMap<String, SecondaryStatus>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SecondaryStatus {
    pub status: String,
    pub last_heartbeat: Option<u64>,
    pub failures: u32,
    pub last_success: Option<u64>,
}

/// `GET /health` response (secondary).
#[derive(Debug, Serialize)]
pub struct SecondaryHealthResponse {
    pub status: &'static str,
    pub count: usize,
    pub delay_ms: u64,
}

/// `POST /replicate` request body (secondary).
#[derive(Debug, Deserialize)]
pub struct ReplicateRequest {
    pub msg: serde_json::Value,
    pub seq: i64,
}

/// `POST /replicate` response (secondary).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReplicateResponse {
    pub status: &'static str,
    pub seq: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<bool>,
}

/// Uniform JSON error body: `{"error": ..., "detail"?: ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    pub fn with_detail(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: Some(detail.into()),
        }
    }
}
