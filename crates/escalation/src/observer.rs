//! Engine Observability

use crate::{ServiceStatus, Target};
use tracing::{debug, error, info};

/// Something the engine did or decided not to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Alert for a service that is already unhealthy or acknowledged
    DuplicateAlert { service_id: String, status: ServiceStatus },
    /// Policy has no level 1 for an alerting service
    MissingFirstLevel { service_id: String },
    /// Timeout, acknowledgement, or healthy signal that no longer applies
    StaleEvent {
        service_id: String,
        kind: &'static str,
        status: Option<ServiceStatus>,
    },
    /// No level above the current one; the chain stops here
    EscalationExhausted { service_id: String, level: u32 },
    /// A target at `level` was notified
    Notified {
        service_id: String,
        level: u32,
        target: Target,
    },
    /// State persisted after a transition
    Transitioned {
        service_id: String,
        from: ServiceStatus,
        to: ServiceStatus,
        level: Option<u32>,
    },
}

/// Injectable sink for engine log events
pub trait EscalationObserver: Send + Sync {
    fn record(&self, event: &EngineEvent);
}

/// Default observer writing through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl EscalationObserver for TracingObserver {
    fn record(&self, event: &EngineEvent) {
        match event {
            EngineEvent::DuplicateAlert { service_id, status } => {
                info!(
                    "Alert for service {} is already active ({}). Ignoring.",
                    service_id, status
                );
            }
            EngineEvent::MissingFirstLevel { service_id } => {
                error!("No escalation levels found for service {}", service_id);
            }
            EngineEvent::StaleEvent {
                service_id,
                kind,
                status,
            } => {
                debug!(
                    "Ignoring stale {} event for service {} (status: {:?})",
                    kind, service_id, status
                );
            }
            EngineEvent::EscalationExhausted { service_id, level } => {
                info!(
                    "Max escalation level reached for service {} (level {})",
                    service_id, level
                );
            }
            EngineEvent::Notified {
                service_id,
                level,
                target,
            } => {
                debug!("Notified {} for service {} at level {}", target, service_id, level);
            }
            EngineEvent::Transitioned {
                service_id,
                from,
                to,
                level,
            } => {
                info!(
                    "Service {} transitioned {} -> {} (level: {:?})",
                    service_id, from, to, level
                );
            }
        }
    }
}
