//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};

use super::AppState;
use super::types::{AnnualRequest, CalculateResponse, ErrorResponse, MonthlyRequest};
use crate::tariff::{RateTables, TariffError};

/// Calculation failure mapped to an HTTP response.
pub struct ApiError(TariffError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TariffError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TariffError::OutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TariffError::ArithmeticIndeterminate(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "calculation failed");
        } else {
            warn!(error = %self.0, "calculation rejected");
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
            kind: self.0.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<TariffError> for ApiError {
    fn from(e: TariffError) -> Self {
        Self(e)
    }
}

/// Malformed bodies (bad JSON, missing or mistyped fields) are invalid input.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(TariffError::InvalidInput(rejection.body_text()))
    }
}

/// Bills a customer from annual totals.
///
/// `POST /api/calculate` → 200 + `CalculateResponse` JSON
/// malformed body, negative or non-finite figures → 400 + `ErrorResponse`
pub async fn calculate_annual(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnnualRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let Json(req) = payload?;
    info!(
        annual_consumption = req.annual_consumption,
        battery_capacity = req.battery_capacity,
        "annual calculation requested"
    );
    let result = state.calculator.compute_from_annual_totals(
        req.annual_consumption,
        req.solar_generation,
        req.battery_capacity,
        req.amp_service,
    )?;
    Ok(Json(CalculateResponse::from(&result)))
}

/// Bills a customer from per-month figures.
///
/// `POST /api/calculate/monthly` → 200 + `CalculateResponse` JSON
/// malformed body or unsupported battery capacity → 400 + `ErrorResponse`
/// consumption above every demand bracket → 422 + `ErrorResponse`
pub async fn calculate_monthly(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MonthlyRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let Json(req) = payload?;
    info!(
        total_consumption = req.total_consumption,
        battery_capacity = req.battery_capacity,
        "monthly calculation requested"
    );
    let result = state.calculator.compute_from_monthly_detail(
        req.battery_capacity,
        req.amp_service,
        &req.monthly_consumption,
        &req.monthly_solar_generation,
        req.total_consumption,
        req.total_solar_generation,
    )?;
    Ok(Json(CalculateResponse::from(&result)))
}

/// Returns the rate tables the calculator is using.
///
/// `GET /api/tariff` → 200 + `RateTables` JSON
pub async fn get_tariff(State(state): State<Arc<AppState>>) -> Json<RateTables> {
    Json(state.calculator.tables().clone())
}
