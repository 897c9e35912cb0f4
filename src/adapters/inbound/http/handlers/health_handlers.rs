use axum::{Json, extract::State, http::StatusCode};
use tracing::warn;

use crate::{
    adapters::inbound::http::{dto::HealthDto, router::AppState},
    domain::errors::ServiceResult,
};

fn health(service: &str, result: ServiceResult<()>) -> (StatusCode, Json<HealthDto>) {
    match result {
        Ok(()) => (StatusCode::OK, Json(HealthDto::up(service))),
        Err(e) => {
            warn!(service, "health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthDto::down(service, &e)),
            )
        }
    }
}

pub async fn storage_health(State(app_state): State<AppState>) -> (StatusCode, Json<HealthDto>) {
    health("S3", app_state.storage_service.health_check().await)
}

pub async fn queue_health(State(app_state): State<AppState>) -> (StatusCode, Json<HealthDto>) {
    health("SQS", app_state.queue_service.health_check().await)
}

pub async fn topic_health(State(app_state): State<AppState>) -> (StatusCode, Json<HealthDto>) {
    health("SNS", app_state.topic_service.health_check().await)
}
