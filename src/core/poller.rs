//! Per-item upload status polling.
//!
//! One poller task per uploaded document, querying the status endpoint on a
//! fixed period until the item reaches a terminal state, a transport error
//! occurs (stop-on-error, no retry), or the wall-clock horizon expires — at
//! which point the item is marked `TimedOut` so a stuck upload never polls
//! forever. Each status change is reported individually so the owning view
//! updates only the affected row. The task is scoped to its handle: dropping
//! the handle (row dismissed, app teardown) aborts the task.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::types::{StatusReport, UploadStatus};
use crate::api::{ApiClient, Result};

/// Default period between status probes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Default polling horizon; matches how long the processing pipeline is
/// expected to take at the outside.
pub const DEFAULT_HORIZON: Duration = Duration::from_secs(120);

/// Where a poller reads item status from. Seam for tests; the app wires in
/// the real API client.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, id: &str) -> Result<StatusReport>;
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn fetch_status(&self, id: &str) -> Result<StatusReport> {
        self.document_status(id).await
    }
}

/// Events a poller reports back to the event loop.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// The item's status changed (including the client-assigned `TimedOut`).
    Status {
        document_id: String,
        status: UploadStatus,
        category: Option<String>,
    },
    /// A transport error ended polling; the row keeps its last status.
    TransportFailed {
        document_id: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub interval: Duration,
    pub horizon: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            horizon: DEFAULT_HORIZON,
        }
    }
}

/// Handle to a running poller task. Dropping it cancels the task.
#[derive(Debug)]
pub struct StatusPoller {
    document_id: String,
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Spawn a poller for one uploaded document.
    pub fn spawn(
        source: Arc<dyn StatusSource>,
        document_id: String,
        config: PollerConfig,
        events: mpsc::UnboundedSender<PollEvent>,
    ) -> Self {
        let id = document_id.clone();
        let handle = tokio::spawn(async move {
            poll_until_settled(source, id, config, events).await;
        });
        Self {
            document_id,
            handle,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn poll_until_settled(
    source: Arc<dyn StatusSource>,
    document_id: String,
    config: PollerConfig,
    events: mpsc::UnboundedSender<PollEvent>,
) {
    let started = tokio::time::Instant::now();
    let mut last_status: Option<UploadStatus> = None;

    loop {
        tokio::time::sleep(config.interval).await;

        if started.elapsed() >= config.horizon {
            log::warn!("status polling for {document_id} hit the horizon, marking timed out");
            let _ = events.send(PollEvent::Status {
                document_id,
                status: UploadStatus::TimedOut,
                category: None,
            });
            return;
        }

        match source.fetch_status(&document_id).await {
            Ok(report) => {
                let changed = last_status != Some(report.status);
                if changed {
                    let _ = events.send(PollEvent::Status {
                        document_id: document_id.clone(),
                        status: report.status,
                        category: report.category,
                    });
                }
                if report.status.is_terminal() {
                    return;
                }
                last_status = Some(report.status);
            }
            Err(error) => {
                log::warn!("status polling for {document_id} failed: {error}");
                let _ = events.send(PollEvent::TransportFailed {
                    document_id,
                    message: error.to_string(),
                });
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted source: yields the scripted statuses in order, repeating the
    /// last one forever. An empty script means transport failure.
    struct Scripted {
        statuses: Vec<UploadStatus>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(statuses: Vec<UploadStatus>) -> Arc<Self> {
            Arc::new(Self {
                statuses,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl StatusSource for Scripted {
        async fn fetch_status(&self, id: &str) -> Result<StatusReport> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.statuses.get(call).or(self.statuses.last()) {
                Some(status) => Ok(StatusReport {
                    id: id.to_string(),
                    name: "doc.pdf".to_string(),
                    status: *status,
                    category: Some("others".to_string()),
                }),
                None => Err(ApiError::server(502, "bad gateway")),
            }
        }
    }

    fn config(interval_ms: u64, horizon_ms: u64) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_millis(interval_ms),
            horizon: Duration::from_millis(horizon_ms),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_terminal_status() {
        let source = Scripted::new(vec![
            UploadStatus::Processing,
            UploadStatus::Processing,
            UploadStatus::Completed,
        ]);
        let (tx, mut rx) = mpsc::unbounded_channel();

        poll_until_settled(source.clone(), "d1".into(), config(10, 10_000), tx).await;

        // Only the two status *changes* are reported.
        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let PollEvent::Status { status, .. } = event {
                seen.push(status);
            }
        }
        assert_eq!(seen, vec![UploadStatus::Processing, UploadStatus::Completed]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_horizon_marks_timed_out() {
        let source = Scripted::new(vec![UploadStatus::Processing]);
        let (tx, mut rx) = mpsc::unbounded_channel();

        poll_until_settled(source, "d1".into(), config(10, 55), tx).await;

        let mut terminal_updates = 0;
        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            if let PollEvent::Status { status, .. } = event {
                if status.is_terminal() {
                    terminal_updates += 1;
                }
                last = Some(status);
            }
        }
        // Exactly one terminal update, and it is the timeout marker.
        assert_eq!(terminal_updates, 1);
        assert_eq!(last, Some(UploadStatus::TimedOut));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_stops_polling() {
        let source = Scripted::new(Vec::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        poll_until_settled(source.clone(), "d1".into(), config(10, 10_000), tx).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            rx.try_recv(),
            Ok(PollEvent::TransportFailed { .. })
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_status_not_rereported() {
        let source = Scripted::new(vec![
            UploadStatus::Processing,
            UploadStatus::Processing,
            UploadStatus::Processing,
            UploadStatus::Failed,
        ]);
        let (tx, mut rx) = mpsc::unbounded_channel();

        poll_until_settled(source, "d1".into(), config(10, 10_000), tx).await;

        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        // Processing once, Failed once.
        assert_eq!(count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_drop_aborts_task() {
        let source = Scripted::new(vec![UploadStatus::Processing]);
        let (tx, _rx) = mpsc::unbounded_channel();

        let poller = StatusPoller::spawn(source, "d1".into(), config(10, 60_000), tx);
        assert_eq!(poller.document_id(), "d1");
        drop(poller);
        // Dropping aborted the task; nothing left to assert beyond not hanging.
    }
}
