//! Quorum Gate (spec §4.2)
//!
//! Admission control for writes based on current peer health. Reads are
//! always served regardless of what this returns.

use std::sync::Arc;

use crate::master::health::HealthMonitor;

pub struct QuorumGate {
    health: Arc<HealthMonitor>,
    peer_count: usize,
}

impl QuorumGate {
    pub fn new(health: Arc<HealthMonitor>, peer_count: usize) -> Self {
        Self { health, peer_count }
    }

    /// Admit a write iff the master plus its healthy peers form a majority
    /// of the total node count. With no peers configured, always admit.
    pub async fn admit(&self) -> bool {
        if self.peer_count == 0 {
            return true;
        }
        let healthy = self.health.healthy_count().await;
        let total = 1 + self.peer_count;
        let majority = total / 2 + 1;
        1 + healthy >= majority
    }
}
