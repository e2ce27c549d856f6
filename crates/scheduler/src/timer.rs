//! Acknowledgement Timer

use crate::DispatcherHandle;
use async_trait::async_trait;
use escalation::ports::TimerScheduler;
use escalation::{EscalationError, EscalationEvent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Timer backed by `tokio::time::sleep`.
///
/// Only the newest timer per service is live. Scheduling again for a service
/// supersedes the earlier timer, which then expires without enqueueing
/// anything. A timeout that fires after the service was acknowledged or
/// resolved is still enqueued and dropped by the engine.
#[derive(Clone)]
pub struct TokioTimerScheduler {
    handle: DispatcherHandle,
    /// Current timer generation per service
    live: Arc<Mutex<HashMap<String, u64>>>,
}

impl TokioTimerScheduler {
    pub fn new(handle: DispatcherHandle) -> Self {
        Self {
            handle,
            live: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Live timers scheduled but not yet fired
    pub fn pending(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TimerScheduler for TokioTimerScheduler {
    async fn set_acknowledgement_timeout(
        &self,
        service_id: &str,
        delay: Duration,
    ) -> Result<(), EscalationError> {
        if self.handle.is_closed() {
            return Err(EscalationError::Timer(
                "dispatcher queue is closed".to_string(),
            ));
        }

        let generation = {
            let mut live = self
                .live
                .lock()
                .map_err(|e| EscalationError::Timer(format!("Lock error: {}", e)))?;
            let generation = live.get(service_id).map_or(0, |g| g + 1);
            if generation > 0 {
                debug!("Superseding pending timeout for {}", service_id);
            }
            live.insert(service_id.to_string(), generation);
            generation
        };

        let handle = self.handle.clone();
        let live = self.live.clone();
        let service_id = service_id.to_string();
        debug!("Acknowledgement timeout for {} in {:?}", service_id, delay);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let current = match live.lock() {
                Ok(mut live) => {
                    let current = live.get(&service_id) == Some(&generation);
                    if current {
                        live.remove(&service_id);
                    }
                    current
                }
                Err(e) => {
                    warn!("Dropping timeout for {}: lock error: {}", service_id, e);
                    return;
                }
            };

            if !current {
                debug!("Superseded timeout for {} expired", service_id);
                return;
            }

            debug!("Acknowledgement timeout fired for {}", service_id);
            if let Err(e) = handle.enqueue(EscalationEvent::timeout(service_id.clone())).await {
                warn!("Dropping timeout for {}: {}", service_id, e);
            }
        });

        Ok(())
    }
}
