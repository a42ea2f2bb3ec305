pub mod webhook;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Fire-and-forget work triggered by booking changes. Handled outside the
/// booking transaction; losing one never undoes a booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingJob {
    GenerateQrCode { tenant_id: i64, booking_id: i64, qr_code: String },
    DeleteQrCode { tenant_id: i64, booking_id: i64, qr_code: Option<String> },
    BookingCreated { tenant_id: i64, booking_id: i64, client_id: i64 },
    BookingCancelled { tenant_id: i64, booking_id: i64, client_id: i64 },
}

pub trait JobQueue: Send + Sync {
    fn enqueue(&self, job: BookingJob) -> anyhow::Result<()>;
}

#[async_trait]
pub trait JobDispatcher: Send + Sync {
    async fn dispatch(&self, job: &BookingJob) -> anyhow::Result<()>;
}

pub struct ChannelJobQueue {
    tx: mpsc::UnboundedSender<BookingJob>,
}

impl JobQueue for ChannelJobQueue {
    fn enqueue(&self, job: BookingJob) -> anyhow::Result<()> {
        self.tx
            .send(job)
            .map_err(|e| anyhow::anyhow!("job worker is gone, dropped {:?}", e.0))
    }
}

/// Starts the worker task. It stops once every queue handle is dropped.
pub fn spawn_worker(dispatcher: Box<dyn JobDispatcher>) -> (ChannelJobQueue, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<BookingJob>();

    let handle = tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            if let Err(e) = dispatcher.dispatch(&job).await {
                tracing::warn!(error = %e, job = ?job, "booking job failed");
            }
        }
        tracing::info!("booking job worker stopped");
    });

    (ChannelJobQueue { tx }, handle)
}

/// Used when no webhook is configured.
pub struct LogDispatcher;

#[async_trait]
impl JobDispatcher for LogDispatcher {
    async fn dispatch(&self, job: &BookingJob) -> anyhow::Result<()> {
        tracing::info!(job = ?job, "booking job");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    struct Recording {
        seen: Arc<Mutex<Vec<BookingJob>>>,
    }

    #[async_trait]
    impl JobDispatcher for Recording {
        async fn dispatch(&self, job: &BookingJob) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(job.clone());
            if matches!(job, BookingJob::DeleteQrCode { .. }) {
                anyhow::bail!("storage offline");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_worker_dispatches_in_order_and_survives_failures() {
        let seen = Arc::new(Mutex::new(vec![]));
        let (queue, handle) = spawn_worker(Box::new(Recording { seen: Arc::clone(&seen) }));

        let jobs = vec![
            BookingJob::DeleteQrCode { tenant_id: 1, booking_id: 1, qr_code: None },
            BookingJob::BookingCreated { tenant_id: 1, booking_id: 2, client_id: 3 },
        ];
        for job in jobs.clone() {
            queue.enqueue(job).unwrap();
        }
        drop(queue);
        handle.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), jobs);
    }

    #[test]
    fn test_job_serializes_with_kind_tag() {
        let job = BookingJob::GenerateQrCode { tenant_id: 1, booking_id: 2, qr_code: "abc".to_string() };
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["kind"], "generate_qr_code");
        assert_eq!(json["booking_id"], 2);
    }
}
