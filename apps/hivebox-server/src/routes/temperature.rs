use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::services::temperature::{
    AggregateOutcome, FailureReason, TemperatureService, TemperatureStatus,
};
use crate::state::AppState;

pub const UNIT_CELSIUS: &str = "°C";

#[derive(Debug, Clone, Serialize)]
pub struct TemperatureResponse {
    pub average_temperature: f64,
    pub unit: &'static str,
    pub status: TemperatureStatus,
    pub measurements_count: usize,
    pub timestamp: DateTime<Utc>,
}

pub(crate) async fn temperature_handler(
    State(service): State<TemperatureService>,
) -> AppResult<Json<TemperatureResponse>> {
    let outcome = service.current().await.map_err(|err| {
        tracing::warn!(error = %err, "temperature aggregation timed out");
        AppError::unavailable("Timed out retrieving temperature data.")
    })?;
    outcome_response(outcome).map(Json)
}

fn outcome_response(outcome: AggregateOutcome) -> AppResult<TemperatureResponse> {
    match outcome {
        Ok(result) => Ok(TemperatureResponse {
            average_temperature: result.average(),
            unit: UNIT_CELSIUS,
            status: result.status(),
            measurements_count: result.count(),
            timestamp: result.timestamp(),
        }),
        Err(failure) => Err(match failure.reason {
            FailureReason::NoData => {
                AppError::unavailable("No recent temperature data available.")
            }
            FailureReason::AllSourcesFailed => {
                AppError::unavailable("Failed to retrieve temperature data")
                    .with_details(failure.diagnostics)
            }
        }),
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/temperature", get(temperature_handler))
}
