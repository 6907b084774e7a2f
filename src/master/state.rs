//! Master node state
//!
//! Owns the log, the per-peer replication queues, the write-concern
//! coordinator, and the health monitor/quorum gate -- the explicit,
//! threaded-through value that replaces the teacher's module-wide globals
//! (see spec §9's Design Notes on "Global mutable state").

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::client::PeerClient;
use crate::config::MasterConfig;
use crate::error::{Error, Result};
use crate::master::coordinator::WriteConcernCoordinator;
use crate::master::health::HealthMonitor;
use crate::master::log::SequencedLog;
use crate::master::queue::PeerQueue;
use crate::master::quorum::QuorumGate;

pub struct WriteOutcome {
    pub messages: Vec<String>,
    pub acks: Vec<String>,
    pub duration: Duration,
}

pub struct MasterState {
    pub config: MasterConfig,
    log: SequencedLog,
    queues: Vec<Arc<PeerQueue>>,
    coordinator: Arc<WriteConcernCoordinator>,
    health: Arc<HealthMonitor>,
    quorum: QuorumGate,
}

impl MasterState {
    pub fn new(config: MasterConfig) -> Arc<Self> {
        let client = PeerClient::new(config.heartbeat_timeout);
        let health = Arc::new(HealthMonitor::new(
            config.secondaries.clone(),
            client,
            config.heartbeat_interval,
            config.suspected_threshold,
            config.unhealthy_threshold,
        ));
        let quorum = QuorumGate::new(Arc::clone(&health), config.secondaries.len());
        let queues: Vec<Arc<PeerQueue>> = config
            .secondaries
            .iter()
            .map(|peer| Arc::new(PeerQueue::new(peer.clone())))
            .collect();

        Arc::new(Self {
            config,
            log: SequencedLog::new(),
            queues,
            coordinator: Arc::new(WriteConcernCoordinator::new()),
            health,
            quorum,
        })
    }

    /// Spawn the health monitor loop and one replication worker per peer.
    /// Intended to be called once, right after construction.
    pub fn spawn_background_tasks(self: &Arc<Self>) {
        let health = Arc::clone(&self.health);
        tokio::spawn(async move { health.run().await });

        let probe_timeout = self.config.heartbeat_timeout;
        for queue in &self.queues {
            let queue = Arc::clone(queue);
            let client = Arc::new(PeerClient::new(probe_timeout.max(Duration::from_secs(2))));
            let coordinator = Arc::clone(&self.coordinator);
            let health = Arc::clone(&self.health);
            tokio::spawn(async move { queue.run(client, coordinator, health).await });
        }
    }

    pub fn total_nodes(&self) -> usize {
        self.config.total_nodes()
    }

    /// `GET /messages`: the master's full log, in ascending seq order.
    pub async fn list_messages(&self) -> Vec<String> {
        self.log.list().await
    }

    pub async fn health_snapshot(&self) -> crate::master::health::PeerSnapshotMap {
        self.health.snapshot().await
    }

    /// Accept a write at the given write concern `w`. Validates `w`,
    /// consults the Quorum Gate, assigns a sequence, fans the entry out to
    /// every peer queue, and -- for `w > 1` -- blocks until enough distinct
    /// acks arrive or the coordinator's timeout elapses.
    pub async fn write(&self, payload: String, w: usize) -> Result<WriteOutcome> {
        if w < 1 || w > self.total_nodes() {
            return Err(Error::BadRequest(format!(
                "w must be in [1, {}]",
                self.total_nodes()
            )));
        }

        if !self.quorum.admit().await {
            return Err(Error::NoQuorum);
        }

        let started = Instant::now();
        let seq = self.log.append(payload.clone()).await;

        // Per spec §4.3, the ack tracker must be registered before the
        // entry is handed to any peer queue: a worker fast enough to
        // delivery-and-ack before we'd otherwise start waiting must still
        // be observed, not dropped on the floor.
        let required_acks = w - 1;
        let waiter = if required_acks > 0 {
            Some(self.coordinator.register(seq, required_acks).await)
        } else {
            None
        };

        for queue in &self.queues {
            queue.enqueue(seq, payload.clone()).await;
        }

        let Some(rx) = waiter else {
            return Ok(WriteOutcome {
                messages: self.log.list().await,
                acks: Vec::new(),
                duration: started.elapsed(),
            });
        };

        match self
            .coordinator
            .wait_registered(seq, required_acks, rx, started)
            .await
        {
            Some(outcome) => Ok(WriteOutcome {
                messages: self.log.list().await,
                acks: outcome.acked_by,
                duration: outcome.duration,
            }),
            None => Err(Error::WriteConcernTimeout { w }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_no_peers() -> MasterConfig {
        MasterConfig {
            host: "127.0.0.1".into(),
            port: 0,
            secondaries: Vec::new(),
            heartbeat_interval: Duration::from_secs(60),
            heartbeat_timeout: Duration::from_secs(1),
            suspected_threshold: 2,
            unhealthy_threshold: 5,
            log_level: "info".into(),
        }
    }

    #[tokio::test]
    async fn w1_with_no_peers_returns_immediately() {
        let state = MasterState::new(config_with_no_peers());
        let outcome = state.write("hello".into(), 1).await.unwrap();
        assert_eq!(outcome.messages, vec!["hello".to_string()]);
        assert!(outcome.acks.is_empty());
    }

    #[tokio::test]
    async fn rejects_out_of_range_w() {
        let state = MasterState::new(config_with_no_peers());
        let err = state.write("hello".into(), 0).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        let err = state.write("hello".into(), 5).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn sequential_writes_stay_in_order() {
        let state = MasterState::new(config_with_no_peers());
        state.write("a".into(), 1).await.unwrap();
        state.write("b".into(), 1).await.unwrap();
        assert_eq!(state.list_messages().await, vec!["a".to_string(), "b".to_string()]);
    }
}
