//! Event Intake Routes
//!
//! Each route queues one event and waits for its handler. Success is
//! `204 No Content` whatever the engine decided; only failures carry a body.

use axum::{extract::State, http::StatusCode, Json};
use escalation::{AcknowledgementEvent, AlertEvent, EscalationEvent, HealthyEvent, TimeoutEvent};
use std::sync::Arc;

use crate::telemetry::record_intake;
use crate::{ApiError, AppState};

async fn submit(state: &AppState, event: EscalationEvent) -> Result<StatusCode, ApiError> {
    if event.service_id().trim().is_empty() {
        return Err(ApiError::BadRequest("service_id must not be empty".to_string()));
    }

    record_intake(event.kind());
    state.dispatcher.submit(event).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn post_alert(
    State(state): State<Arc<AppState>>,
    Json(event): Json<AlertEvent>,
) -> Result<StatusCode, ApiError> {
    submit(&state, EscalationEvent::Alert(event)).await
}

/// Manual re-injection of an acknowledgement timeout
pub async fn post_timeout(
    State(state): State<Arc<AppState>>,
    Json(event): Json<TimeoutEvent>,
) -> Result<StatusCode, ApiError> {
    submit(&state, EscalationEvent::Timeout(event)).await
}

pub async fn post_acknowledgement(
    State(state): State<Arc<AppState>>,
    Json(event): Json<AcknowledgementEvent>,
) -> Result<StatusCode, ApiError> {
    submit(&state, EscalationEvent::Acknowledgement(event)).await
}

pub async fn post_healthy(
    State(state): State<Arc<AppState>>,
    Json(event): Json<HealthyEvent>,
) -> Result<StatusCode, ApiError> {
    submit(&state, EscalationEvent::Healthy(event)).await
}
