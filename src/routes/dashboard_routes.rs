use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::controllers::dashboard_controller::DashboardController;
use crate::dto::dashboard_dto::*;
use crate::dto::ReportWindow;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/kpis", get(kpis))
        .route("/fleet-status", get(fleet_status))
        .route("/fuel-efficiency-trends", get(fuel_efficiency_trends))
        .route("/ridership-trends", get(ridership_trends))
        .route("/cost-analysis", get(cost_analysis))
        .route("/bus-performance", get(bus_performance))
}

async fn kpis(State(state): State<AppState>) -> Result<Json<DashboardKpis>, AppError> {
    let controller = DashboardController::new(state.pool.clone());
    Ok(Json(controller.kpis().await?))
}

async fn fleet_status(State(state): State<AppState>) -> Result<Json<FleetStatus>, AppError> {
    let controller = DashboardController::new(state.pool.clone());
    Ok(Json(controller.fleet_status().await?))
}

async fn fuel_efficiency_trends(
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<Vec<FuelEfficiencyTrend>>, AppError> {
    let controller = DashboardController::new(state.pool.clone());
    Ok(Json(
        controller
            .fuel_efficiency_trends(window.days_or_default())
            .await?,
    ))
}

async fn ridership_trends(
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<Vec<RidershipTrend>>, AppError> {
    let controller = DashboardController::new(state.pool.clone());
    Ok(Json(
        controller.ridership_trends(window.days_or_default()).await?,
    ))
}

async fn cost_analysis(
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<CostAnalysis>, AppError> {
    let controller = DashboardController::new(state.pool.clone());
    Ok(Json(controller.cost_analysis(window.days_or_default()).await?))
}

async fn bus_performance(
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<Vec<BusPerformance>>, AppError> {
    let controller = DashboardController::new(state.pool.clone());
    Ok(Json(
        controller.bus_performance(window.days_or_default()).await?,
    ))
}
