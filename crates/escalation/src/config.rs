//! Engine Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Escalation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Acknowledgement window before escalating (seconds, default: 15)
    pub ack_timeout_secs: u64,
    /// Message sent to escalated levels; `{service_id}` and `{level}` are substituted
    pub escalation_message: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ack_timeout_secs: 15,
            escalation_message:
                "Alert for {service_id} has not been acknowledged and is escalating.".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.ack_timeout_secs)
    }

    /// Render the escalation message for a service reaching `level`
    pub fn render_escalation_message(&self, service_id: &str, level: u32) -> String {
        self.escalation_message
            .replace("{service_id}", service_id)
            .replace("{level}", &level.to_string())
    }
}
