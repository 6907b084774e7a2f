//! Peer Health Monitor (spec §4.5)
//!
//! A single loop probes every secondary each tick and drives a three-state
//! machine per peer. State is observable to the Quorum Gate and to the
//! `/health` read surface; it is mutated only here.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio::time::interval;

use crate::client::PeerClient;

/// Health state of a single peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Healthy,
    Suspected,
    Unhealthy,
}

impl std::fmt::Display for PeerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerState::Healthy => write!(f, "HEALTHY"),
            PeerState::Suspected => write!(f, "SUSPECTED"),
            PeerState::Unhealthy => write!(f, "UNHEALTHY"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PeerRecord {
    pub state: PeerState,
    pub consecutive_failures: u32,
    pub last_probe_ts: Option<Instant>,
    pub last_success_ts: Option<Instant>,
}

impl PeerRecord {
    fn new() -> Self {
        Self {
            state: PeerState::Healthy,
            consecutive_failures: 0,
            last_probe_ts: None,
            last_success_ts: None,
        }
    }
}

/// Health snapshot for every configured peer, keyed by peer base URL.
pub type PeerSnapshotMap = HashMap<String, PeerSnapshot>;

/// Snapshot of a peer's health, safe to hand out across an await point.
#[derive(Debug, Clone)]
pub struct PeerSnapshot {
    pub state: PeerState,
    pub consecutive_failures: u32,
    pub last_heartbeat_ms_ago: Option<u64>,
    pub last_success_ms_ago: Option<u64>,
}

/// Probes all configured secondaries on a fixed interval and tracks their
/// health state. Read access (snapshot / is_healthy) never blocks behind a
/// probe for more than the duration of a lock acquisition.
pub struct HealthMonitor {
    peers: Vec<String>,
    records: RwLock<HashMap<String, PeerRecord>>,
    client: PeerClient,
    probe_interval: Duration,
    suspected_threshold: u32,
    unhealthy_threshold: u32,
}

impl HealthMonitor {
    pub fn new(
        peers: Vec<String>,
        client: PeerClient,
        probe_interval: Duration,
        suspected_threshold: u32,
        unhealthy_threshold: u32,
    ) -> Self {
        let mut records = HashMap::new();
        for peer in &peers {
            records.insert(peer.clone(), PeerRecord::new());
        }
        Self {
            peers,
            records: RwLock::new(records),
            client,
            probe_interval,
            suspected_threshold,
            unhealthy_threshold,
        }
    }

    /// Run the probe loop forever. Intended to be spawned as its own task.
    pub async fn run(&self) {
        let mut ticker = interval(self.probe_interval);
        loop {
            ticker.tick().await;
            self.probe_all().await;
        }
    }

    async fn probe_all(&self) {
        for peer in &self.peers {
            let ok = self.client.health_probe(peer).await.is_ok();
            self.record_probe(peer, ok).await;
        }
    }

    pub(crate) async fn record_probe(&self, peer: &str, ok: bool) {
        let mut records = self.records.write().await;
        let record = records.entry(peer.to_string()).or_insert_with(PeerRecord::new);
        let now = Instant::now();
        record.last_probe_ts = Some(now);

        let previous = record.state;
        if ok {
            record.last_success_ts = Some(now);
            record.consecutive_failures = 0;
            record.state = PeerState::Healthy;
        } else {
            record.consecutive_failures += 1;
            record.state = match record.state {
                PeerState::Healthy => {
                    if record.consecutive_failures >= self.suspected_threshold {
                        PeerState::Suspected
                    } else {
                        PeerState::Healthy
                    }
                }
                PeerState::Suspected => {
                    if record.consecutive_failures >= self.unhealthy_threshold {
                        PeerState::Unhealthy
                    } else {
                        PeerState::Suspected
                    }
                }
                PeerState::Unhealthy => PeerState::Unhealthy,
            };
        }

        if previous != record.state {
            tracing::info!(
                peer = peer,
                from = %previous,
                to = %record.state,
                failures = record.consecutive_failures,
                "peer health transition"
            );
        }
    }

    /// Number of peers currently in state HEALTHY.
    pub async fn healthy_count(&self) -> usize {
        let records = self.records.read().await;
        records.values().filter(|r| r.state == PeerState::Healthy).count()
    }

    /// Snapshot of every peer's health for the `/health` endpoint.
    pub async fn snapshot(&self) -> PeerSnapshotMap {
        let records = self.records.read().await;
        let now = Instant::now();
        records
            .iter()
            .map(|(peer, record)| {
                (
                    peer.clone(),
                    PeerSnapshot {
                        state: record.state,
                        consecutive_failures: record.consecutive_failures,
                        last_heartbeat_ms_ago: record
                            .last_probe_ts
                            .map(|t| now.duration_since(t).as_millis() as u64),
                        last_success_ms_ago: record
                            .last_success_ts
                            .map(|t| now.duration_since(t).as_millis() as u64),
                    },
                )
            })
            .collect()
    }
}
