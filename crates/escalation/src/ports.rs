//! Collaborator Traits
//!
//! The engine depends only on these. Implementations live in the storage,
//! notifier and scheduler crates, and tests substitute recording fakes.

use crate::{EscalationError, EscalationPolicy, MonitoredService, Target};
use async_trait::async_trait;
use std::time::Duration;

/// Durable per-service state.
///
/// Implementations must serialise writes per service: `save_service_state`
/// rejects a value whose `version` no longer matches the stored one with
/// [`EscalationError::Conflict`], and bumps the version on success.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get_service_state(
        &self,
        service_id: &str,
    ) -> Result<Option<MonitoredService>, EscalationError>;

    async fn save_service_state(&self, service: &MonitoredService) -> Result<(), EscalationError>;
}

/// Escalation policy lookup.
///
/// Unconfigured services yield an empty policy (or an error).
#[async_trait]
pub trait PolicySource: Send + Sync {
    async fn get_policy_by_service_id(
        &self,
        service_id: &str,
    ) -> Result<EscalationPolicy, EscalationError>;
}

/// Notification delivery. Must not retry indefinitely.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_notification(&self, target: &Target, message: &str)
        -> Result<(), EscalationError>;
}

/// Acknowledgement timers.
///
/// When `delay` elapses the scheduler re-injects a timeout event for
/// `service_id` into the engine.
#[async_trait]
pub trait TimerScheduler: Send + Sync {
    async fn set_acknowledgement_timeout(
        &self,
        service_id: &str,
        delay: Duration,
    ) -> Result<(), EscalationError>;
}
