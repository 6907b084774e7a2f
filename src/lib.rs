//! seqlog - a tiny replicated append-only log
//!
//! A single master accepts writes of opaque string messages, assigns each a
//! strictly increasing sequence number, and replicates it to a fixed set of
//! secondaries with a per-write, tunable durability requirement (write
//! concern). Secondaries apply entries at most once, in sequence order, and
//! hide reads past the first gap in what they've received so far.
//!
//! # Architecture
//!
//! The master and secondary are separate binaries (`master`, `secondary`):
//! there is no runtime role switch and no leader election, since the
//! master's identity is fixed for the process's lifetime. Replication and
//! health-probing both happen over plain JSON/HTTP.

pub mod client;
pub mod config;
pub mod error;
pub mod master;
pub mod secondary;
pub mod wire;

pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    //! End-to-end scenarios spanning a master and real secondary HTTP
    //! servers, bound on ephemeral ports in-process. These exercise the
    //! seed scenarios that no single module's unit tests can cover on
    //! their own (write concern blocking across real peers, quorum
    //! denial driven by real probe failures).

    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::{MasterConfig, SecondaryConfig};
    use crate::master::MasterState;
    use crate::secondary::apply::ApplyEngine;
    use crate::secondary::{http as secondary_http, SecondaryState};

    /// Binds a secondary on an ephemeral port and returns its base URL.
    /// The server task is leaked for the test's lifetime (process exit
    /// cleans it up); that's fine for a short-lived test binary.
    async fn spawn_secondary(delay_ms: u64) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(SecondaryState {
            config: SecondaryConfig {
                port: addr.port(),
                delay_ms,
                log_level: "error".into(),
            },
            engine: ApplyEngine::new(Duration::from_millis(delay_ms)),
        });
        tokio::spawn(async move {
            axum::serve(listener, secondary_http::router(state))
                .await
                .unwrap();
        });
        format!("http://{addr}")
    }

    fn master_config(secondaries: Vec<String>) -> MasterConfig {
        MasterConfig {
            host: "127.0.0.1".into(),
            port: 0,
            secondaries,
            heartbeat_interval: Duration::from_millis(20),
            heartbeat_timeout: Duration::from_millis(200),
            suspected_threshold: 2,
            unhealthy_threshold: 5,
            log_level: "error".into(),
        }
    }

    /// S1 — default write concern replicates to every secondary and all
    /// three nodes converge on the same log.
    #[tokio::test]
    async fn full_write_concern_replicates_to_every_secondary() {
        let s1 = spawn_secondary(0).await;
        let s2 = spawn_secondary(0).await;
        let state = MasterState::new(master_config(vec![s1.clone(), s2.clone()]));
        state.spawn_background_tasks();

        let outcome = state.write("hello".into(), 3).await.unwrap();
        assert_eq!(outcome.messages, vec!["hello".to_string()]);
        assert_eq!(outcome.acks.len(), 2);

        // Give the (already-satisfied) queues a moment to settle, then
        // confirm both secondaries actually have the message.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let client = reqwest::Client::new();
        for peer in [&s1, &s2] {
            let body: serde_json::Value = client
                .get(format!("{peer}/messages"))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert_eq!(body["messages"][0], "hello");
        }
    }

    /// S2-ish — w=1 never waits on peers, regardless of how many are
    /// configured or how slow they are.
    #[tokio::test]
    async fn w1_returns_without_waiting_for_slow_peers() {
        let slow_peer = spawn_secondary(500).await;
        let state = MasterState::new(master_config(vec![slow_peer]));
        state.spawn_background_tasks();

        let started = std::time::Instant::now();
        let outcome = state.write("fast".into(), 1).await.unwrap();
        assert!(started.elapsed() < Duration::from_millis(200));
        assert!(outcome.acks.is_empty());
    }

    /// S3-flavored — a write requiring acks from both peers completes
    /// once both have actually applied the entry, with real network
    /// round trips in between.
    #[tokio::test]
    async fn w_equal_to_total_nodes_waits_for_every_peer() {
        let s1 = spawn_secondary(0).await;
        let s2 = spawn_secondary(50).await;
        let state = MasterState::new(master_config(vec![s1, s2]));
        state.spawn_background_tasks();

        let outcome = state.write("both-required".into(), 3).await.unwrap();
        let mut acked = outcome.acks;
        acked.sort();
        assert_eq!(acked.len(), 2);
    }

    /// S5 — with a majority of peers unreachable, the master refuses new
    /// writes outright rather than hanging or silently degrading.
    #[tokio::test]
    async fn quorum_denial_rejects_writes_when_majority_of_peers_unreachable() {
        // Two peers that are never actually bound: health probes fail
        // immediately with a connection error.
        let dead_a = "http://127.0.0.1:1".to_string();
        let dead_b = "http://127.0.0.1:2".to_string();
        let state = MasterState::new(master_config(vec![dead_a, dead_b]));
        state.spawn_background_tasks();

        // Wait long enough for the health monitor to cross the
        // suspected threshold on both peers (2 probes at a 20ms
        // interval).
        tokio::time::sleep(Duration::from_millis(150)).await;

        let err = state.write("should-fail".into(), 1).await.unwrap_err();
        assert!(matches!(err, crate::Error::NoQuorum));
    }
}
