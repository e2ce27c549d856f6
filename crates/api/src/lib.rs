//! Escalation Pager API Server
//!
//! HTTP intake for alert, timeout, acknowledgement and healthy events, plus
//! read-only endpoints for service state and sent notifications.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use escalation::{EnginePorts, EscalationEngine, EscalationError};
use metrics_exporter_prometheus::PrometheusHandle;
use notifier::LogNotifier;
use scheduler::{DispatchError, DispatcherHandle, EventDispatcher, TokioTimerScheduler};
use serde::Serialize;
use std::sync::Arc;
use storage::{InMemoryPolicySource, InMemoryStateStore};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
mod routes;
pub mod telemetry;

pub use config::AppConfig;
use telemetry::TelemetryObserver;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Service {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Escalation(#[from] EscalationError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        let escalation = match self {
            ApiError::BadRequest(_) => return StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => return StatusCode::NOT_FOUND,
            ApiError::Io(_) => return StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Dispatch(DispatchError::Handler(e)) | ApiError::Escalation(e) => e,
            ApiError::Dispatch(_) => return StatusCode::SERVICE_UNAVAILABLE,
        };

        match escalation {
            e if e.is_configuration() => StatusCode::UNPROCESSABLE_ENTITY,
            EscalationError::Conflict { .. } => StatusCode::CONFLICT,
            _ => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Queue into the event dispatcher
    pub dispatcher: DispatcherHandle,
    pub engine: Arc<EscalationEngine>,
    pub store: Arc<InMemoryStateStore>,
    pub notifier: Arc<LogNotifier>,
    pub timer: TokioTimerScheduler,
    /// Prometheus handle when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

/// Wire the engine and its adapters from configuration.
///
/// The returned dispatcher must be spawned for events to be processed.
pub fn build(
    config: &AppConfig,
    metrics: Option<PrometheusHandle>,
) -> (Arc<AppState>, EventDispatcher) {
    let (dispatcher, rx) = DispatcherHandle::channel(config.dispatcher.queue_capacity);
    let store = Arc::new(InMemoryStateStore::new());
    let notifier = Arc::new(LogNotifier::new(config.notifier.clone()));
    let timer = TokioTimerScheduler::new(dispatcher.clone());
    let policies = Arc::new(InMemoryPolicySource::with_policies(
        config.policies.iter().cloned(),
    ));

    let engine = Arc::new(EscalationEngine::with_observer(
        EnginePorts {
            store: store.clone(),
            policies,
            notifier: notifier.clone(),
            timer: Arc::new(timer.clone()),
        },
        config.engine.clone(),
        Arc::new(TelemetryObserver::default()),
    ));

    let event_dispatcher = EventDispatcher::new(engine.clone(), rx, config.dispatcher.clone());

    let state = Arc::new(AppState {
        dispatcher,
        engine,
        store,
        notifier,
        timer,
        metrics,
        version: env!("CARGO_PKG_VERSION").to_string(),
        start_time: std::time::Instant::now(),
    });

    (state, event_dispatcher)
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Absent when the store cannot be read
    pub services_tracked: Option<usize>,
    pub pending_timers: usize,
    pub notifications_sent: u64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/events/alert", post(routes::events::post_alert))
        .route("/api/v1/events/timeout", post(routes::events::post_timeout))
        .route(
            "/api/v1/events/acknowledgement",
            post(routes::events::post_acknowledgement),
        )
        .route("/api/v1/events/healthy", post(routes::events::post_healthy))
        .route("/api/v1/services", get(routes::services::list_services))
        .route(
            "/api/v1/services/:service_id",
            get(routes::services::get_service),
        )
        .route(
            "/api/v1/notifications",
            get(routes::notifications::get_notifications),
        )
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let services_tracked = match state.store.len() {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!("Health check could not read the state store: {}", e);
            None
        }
    };
    let degraded = state.dispatcher.is_closed() || services_tracked.is_none();

    Json(HealthResponse {
        status: if degraded {
            "degraded".to_string()
        } else {
            "healthy".to_string()
        },
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        services_tracked,
        pending_timers: state.timer.pending(),
        notifications_sent: state.notifier.sent_count(),
    })
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Run the server until it fails
pub async fn run_server(config: AppConfig) -> Result<(), ApiError> {
    let metrics = if config.server.metrics {
        match telemetry::init_metrics() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("Metrics disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    let (state, dispatcher) = build(&config, metrics);
    tokio::spawn(dispatcher.run());

    let app = create_router(state);

    info!("Starting API server on {}", config.server.addr);

    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
