//! REST API over the bill calculator.
//!
//! Endpoints:
//! - `POST /api/calculate`: bill from annual totals
//! - `POST /api/calculate/monthly`: bill from per-month figures
//! - `GET /api/tariff`: the rate tables in use

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::tariff::Calculator;

pub use types::{AnnualRequest, CalculateResponse, ErrorResponse, MonthlyRequest};

/// Immutable application state shared across all request handlers.
///
/// Built once at startup and wrapped in `Arc`; no locks needed since the
/// calculator is read-only.
pub struct AppState {
    /// Calculator bound to the loaded rate tables.
    pub calculator: Calculator,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/calculate", post(handlers::calculate_annual))
        .route("/api/calculate/monthly", post(handlers::calculate_monthly))
        .route("/api/tariff", get(handlers::get_tariff))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
