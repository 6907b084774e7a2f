//! Secondary Apply Engine (spec §4.6)
//!
//! Receives replication requests, deduplicates by sequence, inserts in
//! sequence order, and exposes a gap-hiding read view: the longest
//! contiguous prefix of the sorted log starting at its lowest seq.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::error::{Error, Result};

/// Outcome of a single `replicate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Inserted,
    Duplicate,
}

pub struct ApplyEngine {
    log: Mutex<BTreeMap<u64, String>>,
    /// Artificial delay applied before the critical section, for testing
    /// concurrent-arrival behavior (spec §4.6).
    delay: Duration,
}

impl ApplyEngine {
    pub fn new(delay: Duration) -> Self {
        Self {
            log: Mutex::new(BTreeMap::new()),
            delay,
        }
    }

    /// Insert `(seq, payload)` if not already present. `seq` must be
    /// positive (spec §9: sequences are positive, `seq <= 0` is rejected).
    pub async fn replicate(&self, seq: i64, payload: String) -> Result<ApplyOutcome> {
        if seq <= 0 {
            return Err(Error::BadRequest("seq must be positive".into()));
        }
        let seq = seq as u64;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut log = self.log.lock().await;
        if log.contains_key(&seq) {
            return Ok(ApplyOutcome::Duplicate);
        }
        log.insert(seq, payload);
        Ok(ApplyOutcome::Inserted)
    }

    /// The longest gap-free prefix starting at seq=1, in ascending order.
    /// Entries beyond the first gap -- including a gap at the very start,
    /// if the lowest stored seq isn't 1 -- are invisible to readers, since
    /// the visible list must be a genuine prefix of the master's log.
    pub async fn list(&self) -> Vec<String> {
        let log = self.log.lock().await;
        let mut result = Vec::new();
        let mut expected: u64 = 1;

        for (&seq, payload) in log.iter() {
            if seq != expected {
                break;
            }
            result.push(payload.clone());
            expected += 1;
        }

        result
    }

    /// Total stored entries, including any past the first gap. Distinct
    /// from `list().len()`, which hides entries beyond a gap.
    pub async fn len(&self) -> usize {
        self.log.lock().await.len()
    }
}
