//! Escalation Events

use serde::{Deserialize, Serialize};

/// Health alert raised for a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub service_id: String,
    pub message: String,
}

/// Acknowledgement window elapsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutEvent {
    pub service_id: String,
}

/// A human confirmed receipt of the alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgementEvent {
    pub service_id: String,
}

/// Service reported healthy again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthyEvent {
    pub service_id: String,
}

/// Any event the engine consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EscalationEvent {
    Alert(AlertEvent),
    Timeout(TimeoutEvent),
    Acknowledgement(AcknowledgementEvent),
    Healthy(HealthyEvent),
}

impl EscalationEvent {
    pub fn alert(service_id: impl Into<String>, message: impl Into<String>) -> Self {
        EscalationEvent::Alert(AlertEvent {
            service_id: service_id.into(),
            message: message.into(),
        })
    }

    pub fn timeout(service_id: impl Into<String>) -> Self {
        EscalationEvent::Timeout(TimeoutEvent {
            service_id: service_id.into(),
        })
    }

    pub fn acknowledgement(service_id: impl Into<String>) -> Self {
        EscalationEvent::Acknowledgement(AcknowledgementEvent {
            service_id: service_id.into(),
        })
    }

    pub fn healthy(service_id: impl Into<String>) -> Self {
        EscalationEvent::Healthy(HealthyEvent {
            service_id: service_id.into(),
        })
    }

    pub fn service_id(&self) -> &str {
        match self {
            EscalationEvent::Alert(e) => &e.service_id,
            EscalationEvent::Timeout(e) => &e.service_id,
            EscalationEvent::Acknowledgement(e) => &e.service_id,
            EscalationEvent::Healthy(e) => &e.service_id,
        }
    }

    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            EscalationEvent::Alert(_) => "alert",
            EscalationEvent::Timeout(_) => "timeout",
            EscalationEvent::Acknowledgement(_) => "acknowledgement",
            EscalationEvent::Healthy(_) => "healthy",
        }
    }
}
