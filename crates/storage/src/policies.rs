//! Escalation Policy Source

use async_trait::async_trait;
use escalation::ports::PolicySource;
use escalation::{EscalationError, EscalationPolicy};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};

/// Policies held in memory, keyed by service id.
///
/// Unknown services get an empty policy; the engine reports that as a
/// configuration error when the service alerts.
pub struct InMemoryPolicySource {
    policies: RwLock<HashMap<String, EscalationPolicy>>,
}

impl InMemoryPolicySource {
    pub fn new() -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_policies(policies: impl IntoIterator<Item = EscalationPolicy>) -> Self {
        let map: HashMap<String, EscalationPolicy> = policies
            .into_iter()
            .map(|p| (p.service_id().to_string(), p))
            .collect();
        info!("Loaded escalation policies for {} services", map.len());
        Self {
            policies: RwLock::new(map),
        }
    }

    /// Add or replace the policy for its service
    pub fn insert_policy(&self, policy: EscalationPolicy) -> Result<(), EscalationError> {
        let mut policies = self
            .policies
            .write()
            .map_err(|e| EscalationError::Policy(format!("Lock error: {}", e)))?;
        debug!(
            "Installing policy for {} ({} levels)",
            policy.service_id(),
            policy.levels().len()
        );
        policies.insert(policy.service_id().to_string(), policy);
        Ok(())
    }

    pub fn len(&self) -> Result<usize, EscalationError> {
        let policies = self
            .policies
            .read()
            .map_err(|e| EscalationError::Policy(format!("Lock error: {}", e)))?;
        Ok(policies.len())
    }

    pub fn is_empty(&self) -> Result<bool, EscalationError> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryPolicySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicySource for InMemoryPolicySource {
    async fn get_policy_by_service_id(
        &self,
        service_id: &str,
    ) -> Result<EscalationPolicy, EscalationError> {
        let policies = self
            .policies
            .read()
            .map_err(|e| EscalationError::Policy(format!("Lock error: {}", e)))?;

        Ok(policies
            .get(service_id)
            .cloned()
            .unwrap_or_else(|| EscalationPolicy::empty(service_id)))
    }
}
