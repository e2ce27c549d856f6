//! Escalation Policy

use crate::EscalationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Notification channel kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Email,
    Sms,
    Push,
    Voice,
    Webhook,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Email => "EMAIL",
            Channel::Sms => "SMS",
            Channel::Push => "PUSH",
            Channel::Voice => "VOICE",
            Channel::Webhook => "WEBHOOK",
        };
        f.write_str(name)
    }
}

/// A single notification destination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub channel: Channel,
    /// Channel-specific address (mailbox, phone number, URL, ...)
    pub address: String,
}

impl Target {
    pub fn new(channel: Channel, address: impl Into<String>) -> Self {
        Self {
            channel,
            address: address.into(),
        }
    }

    pub fn email(address: impl Into<String>) -> Self {
        Self::new(Channel::Email, address)
    }

    pub fn sms(address: impl Into<String>) -> Self {
        Self::new(Channel::Sms, address)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.channel, self.address)
    }
}

/// One rung of an escalation policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationLevel {
    pub level_number: u32,
    /// Notified in list order
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl EscalationLevel {
    pub fn new(level_number: u32, targets: Vec<Target>) -> Self {
        Self {
            level_number,
            targets,
        }
    }
}

/// Ordered, immutable list of escalation levels for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscalationPolicy {
    service_id: String,
    levels: Vec<EscalationLevel>,
}

impl EscalationPolicy {
    /// Build a policy, sorting levels ascending by number.
    ///
    /// Level numbers must be positive and unique. Gaps are allowed; a lookup
    /// that lands in a gap ends the escalation chain.
    pub fn new(
        service_id: impl Into<String>,
        mut levels: Vec<EscalationLevel>,
    ) -> Result<Self, EscalationError> {
        let service_id = service_id.into();
        let mut seen = HashSet::with_capacity(levels.len());

        for level in &levels {
            if level.level_number == 0 {
                return Err(EscalationError::InvalidPolicy(format!(
                    "service {service_id}: level numbers start at 1"
                )));
            }
            if !seen.insert(level.level_number) {
                return Err(EscalationError::InvalidPolicy(format!(
                    "service {service_id}: duplicate level {}",
                    level.level_number
                )));
            }
        }

        levels.sort_by_key(|l| l.level_number);
        Ok(Self { service_id, levels })
    }

    /// Policy with no levels, used for unconfigured services
    pub fn empty(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            levels: Vec::new(),
        }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Look up a level by number. `None` means "no such level".
    pub fn get_level(&self, level_number: u32) -> Option<&EscalationLevel> {
        self.levels
            .binary_search_by_key(&level_number, |l| l.level_number)
            .ok()
            .map(|idx| &self.levels[idx])
    }

    /// Levels in ascending order
    pub fn levels(&self) -> &[EscalationLevel] {
        &self.levels
    }

    pub fn highest_level(&self) -> Option<u32> {
        self.levels.last().map(|l| l.level_number)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[derive(Deserialize)]
struct RawPolicy {
    service_id: String,
    #[serde(default)]
    levels: Vec<EscalationLevel>,
}

impl<'de> Deserialize<'de> for EscalationPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawPolicy::deserialize(deserializer)?;
        EscalationPolicy::new(raw.service_id, raw.levels).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_policy() -> EscalationPolicy {
        EscalationPolicy::new(
            "service-123",
            vec![
                EscalationLevel::new(2, vec![Target::sms("+15551234567")]),
                EscalationLevel::new(1, vec![Target::email("dev@example.com")]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_levels_sorted_on_construction() {
        let policy = sample_policy();
        let numbers: Vec<u32> = policy.levels().iter().map(|l| l.level_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(policy.highest_level(), Some(2));
    }

    #[test]
    fn test_get_level() {
        let policy = sample_policy();
        let level = policy.get_level(2).unwrap();
        assert_eq!(level.targets, vec![Target::sms("+15551234567")]);
        assert!(policy.get_level(3).is_none());
        assert!(policy.get_level(0).is_none());
    }

    #[test]
    fn test_gap_in_levels() {
        let policy = EscalationPolicy::new(
            "svc",
            vec![
                EscalationLevel::new(1, vec![]),
                EscalationLevel::new(3, vec![]),
            ],
        )
        .unwrap();

        assert!(policy.get_level(2).is_none());
        assert!(policy.get_level(3).is_some());
    }

    #[test]
    fn test_rejects_zero_and_duplicates() {
        let zero = EscalationPolicy::new("svc", vec![EscalationLevel::new(0, vec![])]);
        assert!(matches!(zero, Err(EscalationError::InvalidPolicy(_))));

        let dup = EscalationPolicy::new(
            "svc",
            vec![EscalationLevel::new(1, vec![]), EscalationLevel::new(1, vec![])],
        );
        assert!(matches!(dup, Err(EscalationError::InvalidPolicy(_))));
    }

    #[test]
    fn test_empty_policy() {
        let policy = EscalationPolicy::empty("svc");
        assert!(policy.is_empty());
        assert!(policy.get_level(1).is_none());
        assert_eq!(policy.highest_level(), None);
    }

    #[test]
    fn test_target_display() {
        assert_eq!(Target::email("dev@example.com").to_string(), "EMAIL:dev@example.com");
    }
}
