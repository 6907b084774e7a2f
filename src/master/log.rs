//! Sequencer + Log (spec §4.1)
//!
//! Assigns strictly increasing sequence numbers and appends to the master's
//! in-memory, append-only log under a single mutex. The mutex is never held
//! across network I/O -- callers get a `seq` back and do their own
//! replication fan-out afterward.

use tokio::sync::Mutex;

struct Inner {
    next_seq: u64,
    entries: Vec<(u64, String)>,
}

/// The master's append-only log, plus the counter that assigns sequence
/// numbers. Sequences start at 1 and are gap-free on the master.
pub struct SequencedLog {
    inner: Mutex<Inner>,
}

impl SequencedLog {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_seq: 1,
                entries: Vec::new(),
            }),
        }
    }

    /// Assign the next sequence number and append `payload` to the log.
    /// Returns the assigned `seq`.
    pub async fn append(&self, payload: String) -> u64 {
        let mut inner = self.inner.lock().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push((seq, payload));
        seq
    }

    /// All payloads in ascending sequence order.
    pub async fn list(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner.entries.iter().map(|(_, payload)| payload.clone()).collect()
    }
}

impl Default for SequencedLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequences_are_monotonic_and_gap_free() {
        let log = SequencedLog::new();
        let a = log.append("a".into()).await;
        let b = log.append("b".into()).await;
        let c = log.append("c".into()).await;
        assert_eq!((a, b, c), (1, 2, 3));
    }

    #[tokio::test]
    async fn list_returns_ascending_seq_order() {
        let log = SequencedLog::new();
        log.append("first".into()).await;
        log.append("second".into()).await;
        assert_eq!(log.list().await, vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_appends_never_duplicate_a_seq() {
        use std::sync::Arc;

        let log = Arc::new(SequencedLog::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let log = Arc::clone(&log);
            handles.push(tokio::spawn(async move { log.append(format!("m{i}")).await }));
        }
        let mut seqs: Vec<u64> = Vec::new();
        for h in handles {
            seqs.push(h.await.unwrap());
        }
        seqs.sort_unstable();
        let expected: Vec<u64> = (1..=50).collect();
        assert_eq!(seqs, expected);
    }
}
