use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::{jobs, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub time: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        time: Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
pub struct RunNowResponse {
    pub ok: bool,
}

/// On-demand trigger for the full job set. Individual job failures are
/// contained and logged; jobs already in flight from the scheduler are
/// skipped by their guards.
pub async fn run_now(State(state): State<AppState>) -> Json<RunNowResponse> {
    tracing::info!("Manual run requested");
    jobs::run_all_jobs(&state).await;
    Json(RunNowResponse { ok: true })
}
