//! Alert Escalation Engine
//!
//! Drives monitored services through the notify / escalate / acknowledge /
//! resolve lifecycle. Storage, policy lookup, notification delivery and
//! timers are collaborators behind the traits in [`ports`].

mod config;
mod engine;
mod error;
mod event;
mod observer;
mod policy;
pub mod ports;
mod service;

pub use config::EngineConfig;
pub use engine::{EnginePorts, EscalationEngine};
pub use error::EscalationError;
pub use event::{AcknowledgementEvent, AlertEvent, EscalationEvent, HealthyEvent, TimeoutEvent};
pub use observer::{EngineEvent, EscalationObserver, TracingObserver};
pub use policy::{Channel, EscalationLevel, EscalationPolicy, Target};
pub use service::{MonitoredService, ServiceState, ServiceStatus};

/// Level paged when a healthy service first alerts
pub const FIRST_LEVEL: u32 = 1;
