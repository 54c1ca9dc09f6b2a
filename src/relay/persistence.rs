// src/relay/persistence.rs
//! Fire-and-forget persistence.
//!
//! The relay pushes records onto an unbounded queue and moves on. A writer
//! task drains the queue into a [`PersistenceSink`] on the blocking pool,
//! logging failures. Nothing is retried and nothing flows back to the relay.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::PersistenceError;
use crate::relay::record::ClassificationRecord;

pub trait PersistenceSink: Send + Sync {
    fn save_classification(&self, record: &ClassificationRecord) -> Result<(), PersistenceError>;
}

pub type PersistenceReceiver = mpsc::UnboundedReceiver<ClassificationRecord>;

#[derive(Debug, Clone)]
pub struct PersistenceQueue {
    sender: mpsc::UnboundedSender<ClassificationRecord>,
}

impl PersistenceQueue {
    pub fn channel() -> (Self, PersistenceReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Queue plus a spawned writer. The handle resolves once every queue
    /// clone has been dropped and the backlog is written.
    pub fn spawn_writer(sink: Arc<dyn PersistenceSink>) -> (Self, JoinHandle<WriterStats>) {
        let (queue, receiver) = Self::channel();
        let handle = tokio::spawn(run_writer(receiver, sink));
        (queue, handle)
    }

    pub fn submit(&self, record: ClassificationRecord) -> Result<(), PersistenceError> {
        self.sender
            .send(record)
            .map_err(|_| PersistenceError::QueueClosed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub written: usize,
    pub failed: usize,
}

pub async fn run_writer(mut records: PersistenceReceiver, sink: Arc<dyn PersistenceSink>) -> WriterStats {
    let mut stats = WriterStats::default();

    while let Some(record) = records.recv().await {
        // Sinks do blocking I/O, keep it off the async workers.
        let task_sink = Arc::clone(&sink);
        let saved = tokio::task::spawn_blocking(move || {
            let result = task_sink.save_classification(&record);
            (record, result)
        })
        .await;

        match saved {
            Ok((record, Ok(()))) => {
                stats.written += 1;
                info!(
                    "✅ [DB] Saved {} '{}' for {}",
                    record.category, record.code, record.device_key
                );
            }
            Ok((record, Err(e))) => {
                stats.failed += 1;
                error!(
                    "❌ [DB] Save {} '{}' failed: {}",
                    record.category, record.code, e
                );
            }
            Err(e) => {
                stats.failed += 1;
                error!("❌ [DB] Save task aborted: {}", e);
            }
        }
    }

    info!(
        "Persistence writer stopped ({} written, {} failed)",
        stats.written, stats.failed
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::decode::DeviceKey;
    use crate::relay::record::Category;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FlakySink {
        saved: Mutex<Vec<String>>,
    }

    impl PersistenceSink for FlakySink {
        fn save_classification(&self, record: &ClassificationRecord) -> Result<(), PersistenceError> {
            if record.code == "B" {
                return Err(PersistenceError::Unavailable("disk full".to_string()));
            }
            self.saved.lock().unwrap().push(record.code.clone());
            Ok(())
        }
    }

    fn record(code: &str) -> ClassificationRecord {
        ClassificationRecord {
            category: Category::Freshness,
            code: code.to_string(),
            value: None,
            device_key: DeviceKey::default(),
            observed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_writer_counts_failures_and_keeps_going() {
        let sink = Arc::new(FlakySink::default());
        let (queue, handle) = PersistenceQueue::spawn_writer(sink.clone());

        for code in ["SS", "B", "KS"] {
            queue.submit(record(code)).unwrap();
        }
        drop(queue);

        let stats = handle.await.unwrap();
        assert_eq!(stats, WriterStats { written: 2, failed: 1 });
        assert_eq!(*sink.saved.lock().unwrap(), vec!["SS", "KS"]);
    }

    #[test]
    fn test_submit_after_writer_is_gone() {
        let (queue, receiver) = PersistenceQueue::channel();
        drop(receiver);

        assert!(matches!(
            queue.submit(record("S")),
            Err(PersistenceError::QueueClosed)
        ));
    }

    struct GatedSink {
        gate: Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl PersistenceSink for GatedSink {
        fn save_classification(&self, _record: &ClassificationRecord) -> Result<(), PersistenceError> {
            self.gate
                .lock()
                .unwrap()
                .recv()
                .map_err(|_| PersistenceError::Unavailable("gate dropped".to_string()))
        }
    }

    #[tokio::test]
    async fn test_blocking_sink_leaves_runtime_free() {
        let (release, gate) = std::sync::mpsc::channel();
        let sink = Arc::new(GatedSink { gate: Mutex::new(gate) });
        let (queue, handle) = PersistenceQueue::spawn_writer(sink);

        queue.submit(record("S")).unwrap();

        // The writer is now parked inside the sink. On the single-threaded
        // test runtime this only completes if the save runs elsewhere.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        release.send(()).unwrap();
        drop(queue);

        assert_eq!(handle.await.unwrap(), WriterStats { written: 1, failed: 0 });
    }
}
