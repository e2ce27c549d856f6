//! Service State Routes

use axum::{
    extract::{Path, State},
    Json,
};
use escalation::MonitoredService;
use serde::Serialize;
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Response for the service list endpoint
#[derive(Debug, Serialize)]
pub struct ServiceListResponse {
    pub data: Vec<MonitoredService>,
    pub count: usize,
    pub unhealthy_count: usize,
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
) -> Result<Json<MonitoredService>, ApiError> {
    let service = state.engine.service_state(&service_id).await?;
    service.map(Json).ok_or(ApiError::NotFound(service_id))
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ServiceListResponse>, ApiError> {
    let services = state
        .store
        .list()
        .map_err(escalation::EscalationError::from)?;
    let unhealthy = services.iter().filter(|s| s.is_unhealthy()).count();

    Ok(Json(ServiceListResponse {
        count: services.len(),
        unhealthy_count: unhealthy,
        data: services,
    }))
}
