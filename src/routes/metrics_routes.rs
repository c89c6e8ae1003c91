use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{Duration, Utc};

use crate::repositories::bus_repository::BusRepository;
use crate::repositories::operation_repository::OperationRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::services::metrics_service;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_metrics_router() -> Router<AppState> {
    Router::new().route("/", get(prometheus_metrics))
}

/// Exposición en formato de texto de Prometheus a partir del snapshot
/// de los últimos 30 días.
async fn prometheus_metrics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let start = (now - Duration::days(30)).date_naive();
    let end = now.date_naive() + Duration::days(1);

    let bus_repository = BusRepository::new(state.pool.clone());
    let route_repository = RouteRepository::new(state.pool.clone());
    let operation_repository = OperationRepository::new(state.pool.clone());

    let (buses, routes, operations) = futures::try_join!(
        bus_repository.find_all(),
        route_repository.find_all(),
        operation_repository.find_by_date_range(start, end),
    )?;

    let body = metrics_service::render(&buses, &routes, &operations, now)
        .map_err(|e| AppError::Internal(format!("metrics encoding failed: {}", e)))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    ))
}
