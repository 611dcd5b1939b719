use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::bootstrap::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuotaCheck {
    pub status: &'static str,
    pub used: u32,
    pub limit: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub model_quota: QuotaCheck,
    pub checked_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Always 200: an exhausted quota only means chat answers come from the fallback.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let usage = state.pipeline.quota();
    let exhausted = usage.used >= usage.limit;

    let payload = HealthResponse {
        status: if exhausted { "degraded" } else { "ready" },
        service: HealthCheck {
            status: "ready",
            detail: "rexchat-server runtime initialized".to_string(),
        },
        model_quota: QuotaCheck {
            status: if exhausted { "exhausted" } else { "available" },
            used: usage.used,
            limit: usage.limit,
        },
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};

    use crate::bootstrap::testing::state_with;
    use crate::health::health;

    #[tokio::test]
    async fn health_reports_ready_with_remaining_quota() {
        let state = state_with(Ok("ok".to_string()), 3, Arc::default());

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.model_quota.status, "available");
        assert_eq!((payload.model_quota.used, payload.model_quota.limit), (0, 3));
    }

    #[tokio::test]
    async fn health_reports_degraded_once_quota_is_spent() {
        let state = state_with(Ok("ok".to_string()), 1, Arc::default());
        state
            .pipeline
            .respond("Do you do K9 units?")
            .await
            .expect("first model call should be admitted");

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.model_quota.status, "exhausted");
        assert_eq!(payload.model_quota.used, 1);
        assert_eq!(payload.service.status, "ready");
    }
}
