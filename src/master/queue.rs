//! Replication Queue Worker (spec §4.4)
//!
//! One worker per peer, owning an ordered FIFO of pending `(seq, payload)`
//! entries. The worker peeks the head, attempts delivery, and only pops on
//! success -- this is what guarantees in-order delivery to each peer
//! independent of whatever ordering the network happens to provide.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::client::PeerClient;
use crate::master::coordinator::WriteConcernCoordinator;
use crate::master::health::HealthMonitor;

const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(2);
const RETRY_BACKOFF: Duration = Duration::from_millis(200);
const EMPTY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// FIFO of entries pending delivery to one peer.
pub struct PeerQueue {
    peer: String,
    pending: Mutex<VecDeque<(u64, String)>>,
    /// Sequences already delivered to this peer at least once, so a retry
    /// of the *next* head after a success doesn't re-notify the coordinator
    /// for a seq it already acked.
    delivered: Mutex<HashSet<u64>>,
}

impl PeerQueue {
    pub fn new(peer: String) -> Self {
        Self {
            peer,
            pending: Mutex::new(VecDeque::new()),
            delivered: Mutex::new(HashSet::new()),
        }
    }

    /// Enqueue an entry for delivery. Called by the write path immediately
    /// after sequence assignment, so entries arrive here in seq order.
    pub async fn enqueue(&self, seq: u64, payload: String) {
        self.pending.lock().await.push_back((seq, payload));
    }

    /// Run the delivery loop forever. Intended to be spawned as its own
    /// task; on process shutdown it may simply be dropped with items still
    /// queued (restart loses all state by design).
    pub async fn run(
        &self,
        client: Arc<PeerClient>,
        coordinator: Arc<WriteConcernCoordinator>,
        health: Arc<HealthMonitor>,
    ) {
        loop {
            let head = { self.pending.lock().await.front().cloned() };
            let Some((seq, payload)) = head else {
                tokio::time::sleep(EMPTY_POLL_INTERVAL).await;
                continue;
            };

            let attempt =
                tokio::time::timeout(ATTEMPT_TIMEOUT, client.replicate(&self.peer, seq, &payload))
                    .await;

            match attempt {
                Ok(Ok(_response)) => {
                    // Success, including the secondary reporting duplicate.
                    self.pending.lock().await.pop_front();
                    health.record_probe(&self.peer, true).await;

                    let first_delivery = self.delivered.lock().await.insert(seq);
                    if first_delivery {
                        coordinator.notify_ack(seq, &self.peer).await;
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        peer = %self.peer,
                        seq,
                        error = %e,
                        "replication attempt failed, will retry"
                    );
                    health.record_probe(&self.peer, false).await;
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                Err(_elapsed) => {
                    tracing::warn!(peer = %self.peer, seq, "replication attempt timed out, will retry");
                    health.record_probe(&self.peer, false).await;
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
            }
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }
}
