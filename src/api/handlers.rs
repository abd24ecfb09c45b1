//! HTTP request handlers for the health and metrics endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::telemetry::{Meter, MeterSnapshot};
use crate::worker::WorkerRole;

/// Application state shared across handlers.
pub struct AppState {
    pub meter: Arc<Meter>,
    pub role: WorkerRole,
    pub instance_id: Uuid,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(meter: Arc<Meter>, role: WorkerRole, instance_id: Uuid) -> Self {
        Self {
            meter,
            role,
            instance_id,
            started_at: Utc::now(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    role: WorkerRole,
    instance_id: Uuid,
    version: String,
    uptime_secs: i64,
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        role: state.role,
        instance_id: state.instance_id,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// Current counters and the latest gauge readings.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<MeterSnapshot> {
    Json(state.meter.snapshot())
}
