//! Notification Delivery
//!
//! Log-backed notifier: every delivery is written through `tracing` and kept
//! in a bounded outbox that operators can inspect. Channels can be disabled
//! to take a broken provider out of rotation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use escalation::ports::Notifier;
use escalation::{Channel, EscalationError, Target};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Maximum notifications kept in the outbox
    pub max_outbox: usize,
    /// Channels that refuse delivery
    pub disabled_channels: Vec<Channel>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            max_outbox: 1000,
            disabled_channels: Vec::new(),
        }
    }
}

/// A delivered notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub target: Target,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

/// Notifier that logs deliveries and keeps recent ones
pub struct LogNotifier {
    outbox: Mutex<VecDeque<Notification>>,
    max_outbox: usize,
    disabled: HashSet<Channel>,
    sent: AtomicU64,
}

impl LogNotifier {
    pub fn new(config: NotifierConfig) -> Self {
        info!(
            "Creating notifier (outbox: {}, disabled channels: {:?})",
            config.max_outbox, config.disabled_channels
        );
        Self {
            outbox: Mutex::new(VecDeque::with_capacity(config.max_outbox.min(1024))),
            max_outbox: config.max_outbox,
            disabled: config.disabled_channels.into_iter().collect(),
            sent: AtomicU64::new(0),
        }
    }

    /// Most recent notifications, newest first
    pub fn recent(&self, limit: usize) -> Vec<Notification> {
        self.outbox
            .lock()
            .map(|o| o.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Total notifications delivered since start
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    fn deliver(&self, target: &Target, message: &str) -> Result<Notification, EscalationError> {
        if self.disabled.contains(&target.channel) {
            warn!("Channel {} is disabled, cannot notify {}", target.channel, target);
            return Err(EscalationError::Notification(format!(
                "channel {} is disabled",
                target.channel
            )));
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            target: target.clone(),
            message: message.to_string(),
            sent_at: Utc::now(),
        };

        let mut outbox = self
            .outbox
            .lock()
            .map_err(|e| EscalationError::Notification(format!("Lock error: {}", e)))?;

        // Enforce retention
        while outbox.len() >= self.max_outbox && !outbox.is_empty() {
            outbox.pop_front();
        }
        if self.max_outbox > 0 {
            outbox.push_back(notification.clone());
        }

        Ok(notification)
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new(NotifierConfig::default())
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_notification(
        &self,
        target: &Target,
        message: &str,
    ) -> Result<(), EscalationError> {
        let notification = self.deliver(target, message)?;
        self.sent.fetch_add(1, Ordering::Relaxed);
        info!(
            notification_id = %notification.id,
            channel = %target.channel,
            address = %target.address,
            "Notification sent: {}",
            message
        );
        Ok(())
    }
}
