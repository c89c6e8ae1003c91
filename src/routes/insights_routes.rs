use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::controllers::insights_controller::InsightsController;
use crate::dto::insights_dto::*;
use crate::dto::ReportWindow;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_insights_router() -> Router<AppState> {
    Router::new()
        .route("/fuel-wasters", get(fuel_wasters))
        .route("/empty-buses", get(empty_buses))
        .route("/driver-performance", get(driver_performance))
        .route("/maintenance-alerts", get(maintenance_alerts))
        .route("/route-optimization", get(route_optimization))
        .route("/roi-summary", get(roi_summary))
        .route("/narrative", get(narrative))
}

async fn fuel_wasters(
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<FuelWasterAnalysis>, AppError> {
    let controller = InsightsController::new(state.pool.clone());
    Ok(Json(controller.fuel_wasters(window.days_or_default()).await?))
}

async fn empty_buses(
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<EmptyBusAnalysis>, AppError> {
    let controller = InsightsController::new(state.pool.clone());
    Ok(Json(controller.empty_buses(window.days_or_default()).await?))
}

async fn driver_performance(
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<DriverPerformanceAnalysis>, AppError> {
    let controller = InsightsController::new(state.pool.clone());
    Ok(Json(
        controller.driver_performance(window.days_or_default()).await?,
    ))
}

async fn maintenance_alerts(
    State(state): State<AppState>,
) -> Result<Json<MaintenanceAlertAnalysis>, AppError> {
    let controller = InsightsController::new(state.pool.clone());
    Ok(Json(controller.maintenance_alerts().await?))
}

async fn route_optimization(
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<RouteOptimizationAnalysis>, AppError> {
    let controller = InsightsController::new(state.pool.clone());
    Ok(Json(
        controller.route_optimization(window.days_or_default()).await?,
    ))
}

async fn roi_summary(
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<RoiSummary>, AppError> {
    let controller = InsightsController::new(state.pool.clone());
    Ok(Json(controller.roi_summary(window.days_or_default()).await?))
}

async fn narrative(
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<NarrativeResponse>, AppError> {
    let controller = InsightsController::new(state.pool.clone());
    Ok(Json(
        controller
            .narrative(window.days_or_default(), state.ai_service.as_ref())
            .await?,
    ))
}
