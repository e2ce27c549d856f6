//! Monitored Service State

use serde::{Deserialize, Serialize};
use std::fmt;

/// Health status of a monitored service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
    Acknowledged,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceStatus::Healthy => "HEALTHY",
            ServiceStatus::Unhealthy => "UNHEALTHY",
            ServiceStatus::Acknowledged => "ACKNOWLEDGED",
        };
        f.write_str(name)
    }
}

/// Status together with the escalation level it carries.
///
/// A healthy service has no level; the other states always have one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceState {
    Healthy,
    Unhealthy { current_level: u32 },
    Acknowledged { current_level: u32 },
}

impl ServiceState {
    /// Rebuild from a flat status + level pair, rejecting combinations that
    /// break the healthy-has-no-level rule.
    pub fn from_parts(status: ServiceStatus, current_level: Option<u32>) -> Option<Self> {
        match (status, current_level) {
            (ServiceStatus::Healthy, None) => Some(ServiceState::Healthy),
            (ServiceStatus::Unhealthy, Some(current_level)) => {
                Some(ServiceState::Unhealthy { current_level })
            }
            (ServiceStatus::Acknowledged, Some(current_level)) => {
                Some(ServiceState::Acknowledged { current_level })
            }
            _ => None,
        }
    }
}

/// Latest known state of one monitored service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredService {
    pub service_id: String,
    #[serde(flatten)]
    state: ServiceState,
    /// Store version this value was loaded at (0 = never saved)
    #[serde(default)]
    pub version: u64,
}

impl MonitoredService {
    /// Fresh, never-persisted healthy record
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            state: ServiceState::Healthy,
            version: 0,
        }
    }

    pub fn with_state(service_id: impl Into<String>, state: ServiceState, version: u64) -> Self {
        Self {
            service_id: service_id.into(),
            state,
            version,
        }
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn status(&self) -> ServiceStatus {
        match self.state {
            ServiceState::Healthy => ServiceStatus::Healthy,
            ServiceState::Unhealthy { .. } => ServiceStatus::Unhealthy,
            ServiceState::Acknowledged { .. } => ServiceStatus::Acknowledged,
        }
    }

    /// Last level notified; `None` while healthy
    pub fn current_level(&self) -> Option<u32> {
        match self.state {
            ServiceState::Healthy => None,
            ServiceState::Unhealthy { current_level }
            | ServiceState::Acknowledged { current_level } => Some(current_level),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.state, ServiceState::Healthy)
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self.state, ServiceState::Unhealthy { .. })
    }

    pub fn is_acknowledged(&self) -> bool {
        matches!(self.state, ServiceState::Acknowledged { .. })
    }

    /// Unhealthy at `level`, from any prior status
    #[must_use]
    pub fn mark_unhealthy(&self, level: u32) -> Self {
        self.transition(ServiceState::Unhealthy {
            current_level: level,
        })
    }

    /// Acknowledged, keeping the level reached.
    ///
    /// A healthy record has no level to keep and is returned unchanged.
    #[must_use]
    pub fn mark_acknowledged(&self) -> Self {
        match self.current_level() {
            Some(current_level) => self.transition(ServiceState::Acknowledged { current_level }),
            None => self.clone(),
        }
    }

    /// Healthy, clearing escalation history
    #[must_use]
    pub fn mark_healthy(&self) -> Self {
        self.transition(ServiceState::Healthy)
    }

    fn transition(&self, state: ServiceState) -> Self {
        Self {
            service_id: self.service_id.clone(),
            state,
            version: self.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_service_is_healthy() {
        let service = MonitoredService::new("svc");
        assert!(service.is_healthy());
        assert_eq!(service.current_level(), None);
        assert_eq!(service.version, 0);
    }

    #[test]
    fn test_transitions_return_new_values() {
        let healthy = MonitoredService::new("svc");
        let unhealthy = healthy.mark_unhealthy(1);

        assert!(healthy.is_healthy());
        assert!(unhealthy.is_unhealthy());
        assert_eq!(unhealthy.current_level(), Some(1));
    }

    #[test]
    fn test_acknowledge_preserves_level() {
        let service = MonitoredService::new("svc").mark_unhealthy(3).mark_acknowledged();
        assert_eq!(service.status(), ServiceStatus::Acknowledged);
        assert_eq!(service.current_level(), Some(3));
    }

    #[test]
    fn test_healthy_clears_level() {
        let service = MonitoredService::new("svc").mark_unhealthy(2).mark_healthy();
        assert_eq!(service.status(), ServiceStatus::Healthy);
        assert_eq!(service.current_level(), None);
    }

    #[test]
    fn test_version_carried_through_transitions() {
        let service = MonitoredService::with_state("svc", ServiceState::Healthy, 7);
        assert_eq!(service.mark_unhealthy(1).version, 7);
    }

    #[test]
    fn test_state_from_parts() {
        assert_eq!(
            ServiceState::from_parts(ServiceStatus::Unhealthy, Some(2)),
            Some(ServiceState::Unhealthy { current_level: 2 })
        );
        assert_eq!(
            ServiceState::from_parts(ServiceStatus::Healthy, None),
            Some(ServiceState::Healthy)
        );
        assert_eq!(ServiceState::from_parts(ServiceStatus::Healthy, Some(1)), None);
        assert_eq!(ServiceState::from_parts(ServiceStatus::Acknowledged, None), None);
    }

    #[test]
    fn test_wire_format() {
        let service = MonitoredService::with_state(
            "service-123",
            ServiceState::Unhealthy { current_level: 1 },
            2,
        );
        let json = serde_json::to_value(&service).unwrap();
        assert_eq!(json["status"], "UNHEALTHY");
        assert_eq!(json["current_level"], 1);
        assert_eq!(json["version"], 2);

        let back: MonitoredService = serde_json::from_value(json).unwrap();
        assert_eq!(back, service);
    }
}
