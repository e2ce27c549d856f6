//! Notification Routes

use axum::{
    extract::{Query, State},
    Json,
};
use notifier::Notification;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

/// Query parameters for notifications endpoint
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for notifications endpoint
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub data: Vec<Notification>,
    pub count: usize,
    pub total_sent: u64,
}

/// Recently sent notifications, newest first
pub async fn get_notifications(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NotificationQuery>,
) -> Json<NotificationResponse> {
    let data = state.notifier.recent(params.limit.min(1000));

    Json(NotificationResponse {
        count: data.len(),
        total_sent: state.notifier.sent_count(),
        data,
    })
}
