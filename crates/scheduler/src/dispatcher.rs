//! Event Dispatcher
//!
//! All events for all services pass through a single queue and are handled
//! strictly in arrival order. Within one process this rules out two handlers
//! for the same service interleaving their load and save.

use escalation::{EscalationEngine, EscalationError, EscalationEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

/// Dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Queued events before submitters wait
    pub queue_capacity: usize,
    /// Retries for retryable handler failures
    pub max_retries: u8,
    /// Retry backoff base in milliseconds (multiplied by attempt)
    pub retry_backoff_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            max_retries: 3,
            retry_backoff_ms: 100,
        }
    }
}

/// Dispatch errors
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Event queue is closed")]
    QueueClosed,
    #[error("Dispatcher dropped the request")]
    NoReply,
    #[error(transparent)]
    Handler(#[from] EscalationError),
}

/// An event plus an optional channel for the handler result
pub struct DispatchRequest {
    pub event: EscalationEvent,
    pub reply: Option<oneshot::Sender<Result<(), EscalationError>>>,
}

/// Sending side of the dispatcher queue
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<DispatchRequest>,
}

impl DispatcherHandle {
    /// Create the queue. The receiver goes to [`EventDispatcher::new`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DispatchRequest>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Queue an event and wait for its handler result
    pub async fn submit(&self, event: EscalationEvent) -> Result<(), DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(DispatchRequest {
                event,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| DispatchError::QueueClosed)?;

        reply_rx.await.map_err(|_| DispatchError::NoReply)??;
        Ok(())
    }

    /// Queue an event without waiting for it to be handled
    pub async fn enqueue(&self, event: EscalationEvent) -> Result<(), DispatchError> {
        self.tx
            .send(DispatchRequest { event, reply: None })
            .await
            .map_err(|_| DispatchError::QueueClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Single consumer driving the engine
pub struct EventDispatcher {
    engine: Arc<EscalationEngine>,
    rx: mpsc::Receiver<DispatchRequest>,
    config: DispatcherConfig,
}

impl EventDispatcher {
    pub fn new(
        engine: Arc<EscalationEngine>,
        rx: mpsc::Receiver<DispatchRequest>,
        config: DispatcherConfig,
    ) -> Self {
        Self { engine, rx, config }
    }

    /// Run until the queue closes.
    ///
    /// The queue closes once every [`DispatcherHandle`] is dropped. A
    /// [`TokioTimerScheduler`](crate::TokioTimerScheduler) wired into the
    /// engine holds a handle itself, so a fully wired dispatcher runs for the
    /// life of the process.
    pub async fn run(mut self) {
        info!("Starting event dispatcher");

        while let Some(request) = self.rx.recv().await {
            let result = self.process(&request.event).await;

            match request.reply {
                Some(reply) => {
                    let _ = reply.send(result);
                }
                None => {
                    if let Err(e) = result {
                        error!(
                            "Unhandled failure for {} event on {}: {}",
                            request.event.kind(),
                            request.event.service_id(),
                            e
                        );
                    }
                }
            }
        }

        info!("Event dispatcher stopped");
    }

    /// Run the handler, retrying the whole handler on retryable failures.
    ///
    /// A retry re-runs every side effect, so targets notified before the
    /// failure are notified again.
    async fn process(&self, event: &EscalationEvent) -> Result<(), EscalationError> {
        let mut attempt: u8 = 0;

        loop {
            match self.engine.dispatch(event).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} event for {} failed (attempt {}): {}",
                        event.kind(),
                        event.service_id(),
                        attempt,
                        e
                    );
                    let backoff = self.config.retry_backoff_ms * u64::from(attempt);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => {
                    if e.is_configuration() {
                        error!("{} event for {}: {}", event.kind(), event.service_id(), e);
                    }
                    return Err(e);
                }
            }
        }
    }
}
