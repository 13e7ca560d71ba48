// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use atelier_server_api::HealthResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::api::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server and database are reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
/// Liveness check. Does not require authentication.
#[tracing::instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let version = env!("CARGO_PKG_VERSION").to_string();

	match sqlx::query("SELECT 1").execute(&state.pool).await {
		Ok(_) => (
			StatusCode::OK,
			Json(HealthResponse {
				status: "ok".to_string(),
				version,
			}),
		),
		Err(e) => {
			tracing::warn!(error = %e, "health check database probe failed");
			(
				StatusCode::SERVICE_UNAVAILABLE,
				Json(HealthResponse {
					status: "degraded".to_string(),
					version,
				}),
			)
		}
	}
}
