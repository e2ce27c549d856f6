//! Escalation Engine
//!
//! Every handler follows the same shape: load state, decide, notify,
//! schedule the acknowledgement timer, persist. Side effects happen in that
//! order, so a failure after notifying leaves nothing persisted and a retry
//! may notify again (at-least-once delivery).

use crate::ports::{Notifier, PolicySource, StateStore, TimerScheduler};
use crate::{
    AcknowledgementEvent, AlertEvent, EngineConfig, EngineEvent, EscalationError, EscalationEvent,
    EscalationLevel, EscalationObserver, HealthyEvent, MonitoredService, TimeoutEvent,
    TracingObserver, FIRST_LEVEL,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Collaborators the engine drives
#[derive(Clone)]
pub struct EnginePorts {
    pub store: Arc<dyn StateStore>,
    pub policies: Arc<dyn PolicySource>,
    pub notifier: Arc<dyn Notifier>,
    pub timer: Arc<dyn TimerScheduler>,
}

/// Escalation state machine
pub struct EscalationEngine {
    ports: EnginePorts,
    observer: Arc<dyn EscalationObserver>,
    config: EngineConfig,
}

impl EscalationEngine {
    /// Create an engine that logs through `tracing`
    pub fn new(ports: EnginePorts, config: EngineConfig) -> Self {
        Self::with_observer(ports, config, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        ports: EnginePorts,
        config: EngineConfig,
        observer: Arc<dyn EscalationObserver>,
    ) -> Self {
        debug!("Creating escalation engine with config: {:?}", config);
        Self {
            ports,
            observer,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Route an event to its handler
    pub async fn dispatch(&self, event: &EscalationEvent) -> Result<(), EscalationError> {
        match event {
            EscalationEvent::Alert(e) => self.handle_alert(e).await,
            EscalationEvent::Timeout(e) => self.handle_timeout(e).await,
            EscalationEvent::Acknowledgement(e) => self.handle_acknowledgement(e).await,
            EscalationEvent::Healthy(e) => self.handle_healthy(e).await,
        }
    }

    /// Current stored state, if the service was ever seen
    pub async fn service_state(
        &self,
        service_id: &str,
    ) -> Result<Option<MonitoredService>, EscalationError> {
        self.ports.store.get_service_state(service_id).await
    }

    /// Healthy service alerting: page level 1 and start the timer.
    ///
    /// Alerts for services already unhealthy or acknowledged are ignored
    /// without touching any collaborator besides the store read.
    #[instrument(skip(self, event), fields(service_id = %event.service_id))]
    pub async fn handle_alert(&self, event: &AlertEvent) -> Result<(), EscalationError> {
        let service = self
            .ports
            .store
            .get_service_state(&event.service_id)
            .await?
            .unwrap_or_else(|| MonitoredService::new(event.service_id.clone()));

        if !service.is_healthy() {
            self.observer.record(&EngineEvent::DuplicateAlert {
                service_id: event.service_id.clone(),
                status: service.status(),
            });
            return Ok(());
        }

        let policy = self
            .ports
            .policies
            .get_policy_by_service_id(&event.service_id)
            .await?;

        let Some(level) = policy.get_level(FIRST_LEVEL) else {
            self.observer.record(&EngineEvent::MissingFirstLevel {
                service_id: event.service_id.clone(),
            });
            return Err(EscalationError::MissingFirstLevel {
                service_id: event.service_id.clone(),
            });
        };

        let next = service.mark_unhealthy(FIRST_LEVEL);
        self.page_level(&event.service_id, level, &event.message).await?;
        self.schedule_timeout(&event.service_id).await?;
        self.persist(&service, &next).await
    }

    /// Unacknowledged timeout: page the next level, or stop if there is none
    #[instrument(skip(self, event), fields(service_id = %event.service_id))]
    pub async fn handle_timeout(&self, event: &TimeoutEvent) -> Result<(), EscalationError> {
        let Some(service) = self.load_unhealthy(&event.service_id, "timeout").await? else {
            return Ok(());
        };

        let policy = self
            .ports
            .policies
            .get_policy_by_service_id(&event.service_id)
            .await?;

        let current_level = service.current_level().unwrap_or(0);
        let next_level = current_level
            .checked_add(1)
            .and_then(|n| policy.get_level(n));

        let Some(level) = next_level else {
            self.observer.record(&EngineEvent::EscalationExhausted {
                service_id: event.service_id.clone(),
                level: current_level,
            });
            return Ok(());
        };

        let next = service.mark_unhealthy(level.level_number);
        let message = self
            .config
            .render_escalation_message(&event.service_id, level.level_number);
        self.page_level(&event.service_id, level, &message).await?;
        self.schedule_timeout(&event.service_id).await?;
        self.persist(&service, &next).await
    }

    /// Acknowledgement silences escalation; the level reached is kept
    #[instrument(skip(self, event), fields(service_id = %event.service_id))]
    pub async fn handle_acknowledgement(
        &self,
        event: &AcknowledgementEvent,
    ) -> Result<(), EscalationError> {
        let Some(service) = self
            .load_unhealthy(&event.service_id, "acknowledgement")
            .await?
        else {
            return Ok(());
        };

        let next = service.mark_acknowledged();
        self.persist(&service, &next).await
    }

    /// Service recovered. Pending timers are left to expire as stale no-ops.
    #[instrument(skip(self, event), fields(service_id = %event.service_id))]
    pub async fn handle_healthy(&self, event: &HealthyEvent) -> Result<(), EscalationError> {
        let service = self.ports.store.get_service_state(&event.service_id).await?;

        let service = match service {
            Some(service) if !service.is_healthy() => service,
            other => {
                self.stale(&event.service_id, "healthy", other.as_ref());
                return Ok(());
            }
        };

        let next = service.mark_healthy();
        self.persist(&service, &next).await
    }

    async fn load_unhealthy(
        &self,
        service_id: &str,
        kind: &'static str,
    ) -> Result<Option<MonitoredService>, EscalationError> {
        match self.ports.store.get_service_state(service_id).await? {
            Some(service) if service.is_unhealthy() => Ok(Some(service)),
            other => {
                self.stale(service_id, kind, other.as_ref());
                Ok(None)
            }
        }
    }

    fn stale(&self, service_id: &str, kind: &'static str, service: Option<&MonitoredService>) {
        self.observer.record(&EngineEvent::StaleEvent {
            service_id: service_id.to_string(),
            kind,
            status: service.map(MonitoredService::status),
        });
    }

    /// Notify every target of `level` in list order, stopping at the first failure
    async fn page_level(
        &self,
        service_id: &str,
        level: &EscalationLevel,
        message: &str,
    ) -> Result<(), EscalationError> {
        for target in &level.targets {
            self.ports.notifier.send_notification(target, message).await?;
            self.observer.record(&EngineEvent::Notified {
                service_id: service_id.to_string(),
                level: level.level_number,
                target: target.clone(),
            });
        }
        Ok(())
    }

    async fn schedule_timeout(&self, service_id: &str) -> Result<(), EscalationError> {
        self.ports
            .timer
            .set_acknowledgement_timeout(service_id, self.config.ack_timeout())
            .await
    }

    async fn persist(
        &self,
        previous: &MonitoredService,
        next: &MonitoredService,
    ) -> Result<(), EscalationError> {
        self.ports.store.save_service_state(next).await?;
        self.observer.record(&EngineEvent::Transitioned {
            service_id: next.service_id.clone(),
            from: previous.status(),
            to: next.status(),
            level: next.current_level(),
        });
        Ok(())
    }
}

impl std::fmt::Debug for EscalationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscalationEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

