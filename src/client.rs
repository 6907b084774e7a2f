//! Peer HTTP client
//!
//! Thin `reqwest` wrapper used by the replication queue workers (to deliver
//! entries) and the health monitor (to probe liveness). Mirrors the
//! `HTTP_CLIENT` / forwarding pattern already used for leader-forwarding in
//! the teacher codebase, generalized to a reusable client the master's
//! background tasks share.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::wire::ReplicateResponse;

#[derive(Clone)]
pub struct PeerClient {
    http: reqwest::Client,
}

impl PeerClient {
    /// `timeout` bounds every individual request issued through this client
    /// (the per-attempt replication timeout, or the health probe timeout).
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { http }
    }

    /// Deliver `(seq, msg)` to a secondary's `/replicate` endpoint. Treats a
    /// 200 response (including `duplicate: true`) as success; anything else
    /// is a transient failure for the caller to retry.
    pub async fn replicate(&self, peer: &str, seq: u64, msg: &str) -> Result<ReplicateResponse> {
        let url = format!("{}/replicate", peer.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "msg": msg, "seq": seq }))
            .send()
            .await
            .map_err(|_| Error::ConnectionTimeout(peer.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Peer(format!(
                "{} responded with {}",
                peer,
                response.status()
            )));
        }

        response
            .json::<ReplicateResponse>()
            .await
            .map_err(|e| Error::Peer(format!("malformed response from {peer}: {e}")))
    }

    /// Liveness probe against a secondary's `/health` endpoint.
    pub async fn health_probe(&self, peer: &str) -> Result<()> {
        let url = format!("{}/health", peer.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|_| Error::ConnectionTimeout(peer.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::Peer(format!(
                "{} health probe responded with {}",
                peer,
                response.status()
            )))
        }
    }
}
