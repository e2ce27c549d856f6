//! Logging and Metrics

use crate::config::LoggingConfig;
use escalation::{EngineEvent, EscalationObserver, TracingObserver};
use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    }
}

/// Install the Prometheus recorder backing `/metrics`
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Count an event accepted by the intake API
pub fn record_intake(kind: &'static str) {
    counter!("pager_events_total", "kind" => kind).increment(1);
}

/// Engine observer that logs through `tracing` and updates counters
#[derive(Debug, Default)]
pub struct TelemetryObserver {
    inner: TracingObserver,
}

impl EscalationObserver for TelemetryObserver {
    fn record(&self, event: &EngineEvent) {
        self.inner.record(event);

        match event {
            EngineEvent::Notified { target, .. } => {
                counter!("pager_notifications_total", "channel" => target.channel.to_string())
                    .increment(1);
            }
            EngineEvent::EscalationExhausted { .. } => {
                counter!("pager_escalations_exhausted_total").increment(1);
            }
            EngineEvent::MissingFirstLevel { .. } => {
                counter!("pager_configuration_errors_total").increment(1);
            }
            EngineEvent::DuplicateAlert { .. } => {
                counter!("pager_duplicate_alerts_total").increment(1);
            }
            EngineEvent::StaleEvent { kind, .. } => {
                counter!("pager_stale_events_total", "kind" => *kind).increment(1);
            }
            EngineEvent::Transitioned { to, .. } => {
                counter!("pager_transitions_total", "to" => to.to_string()).increment(1);
            }
        }
    }
}
