//! Escalation Error Types

use thiserror::Error;

/// Errors raised while handling an escalation event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscalationError {
    /// Alerting service has no level 1 in its policy
    #[error("No escalation levels found for service {service_id}")]
    MissingFirstLevel { service_id: String },

    /// Policy failed construction checks
    #[error("Invalid escalation policy: {0}")]
    InvalidPolicy(String),

    /// State store read or write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored state changed between load and save
    #[error("Concurrent update detected for service {service_id}")]
    Conflict { service_id: String },

    /// Policy source failed
    #[error("Policy source error: {0}")]
    Policy(String),

    /// Notification delivery failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// Timeout could not be scheduled
    #[error("Timer error: {0}")]
    Timer(String),
}

impl EscalationError {
    /// Whether re-running the whole handler may succeed.
    ///
    /// Collaborator failures are retryable. Configuration problems are not:
    /// retrying an alert for a service without level 1 fails the same way.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            EscalationError::MissingFirstLevel { .. } | EscalationError::InvalidPolicy(_)
        )
    }

    /// Configuration errors must reach operators rather than be retried away
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EscalationError::MissingFirstLevel { .. } | EscalationError::InvalidPolicy(_)
        )
    }
}
