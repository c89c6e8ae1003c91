use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::bus_controller::BusController;
use crate::dto::bus_dto::{
    BusResponse, CompleteMaintenanceRequest, CreateBusRequest, FleetStatisticsResponse,
    MaintenanceRecordResponse, OutOfServiceRequest, RetireBusRequest, ScheduleMaintenanceRequest,
    UpdateMileageRequest,
};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_bus_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_bus).get(list_buses))
        .route("/statistics", get(fleet_statistics))
        .route("/maintenance/required", get(requiring_maintenance))
        .route("/status/:status", get(buses_by_status))
        .route("/:id", get(get_bus))
        .route("/:id", delete(delete_bus))
        .route("/:id/mileage", put(update_mileage))
        .route("/:id/maintenance", get(maintenance_history))
        .route("/:id/maintenance/schedule", post(schedule_maintenance))
        .route("/:id/maintenance/complete", post(complete_maintenance))
        .route("/:id/retire", post(retire_bus))
        .route("/:id/reactivate", post(reactivate_bus))
        .route("/:id/out-of-service", post(out_of_service))
}

async fn create_bus(
    State(state): State<AppState>,
    Json(request): Json<CreateBusRequest>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.create(request).await?))
}

async fn list_buses(
    State(state): State<AppState>,
) -> Result<Json<Vec<BusResponse>>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.list().await?))
}

async fn get_bus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BusResponse>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn buses_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<BusResponse>>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.list_by_status(&status).await?))
}

async fn requiring_maintenance(
    State(state): State<AppState>,
) -> Result<Json<Vec<BusResponse>>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.list_requiring_maintenance().await?))
}

async fn maintenance_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MaintenanceRecordResponse>>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.maintenance_history(id).await?))
}

async fn fleet_statistics(
    State(state): State<AppState>,
) -> Result<Json<FleetStatisticsResponse>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.statistics().await?))
}

async fn update_mileage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMileageRequest>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.update_mileage(id, request).await?))
}

async fn schedule_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ScheduleMaintenanceRequest>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.schedule_maintenance(id, request).await?))
}

async fn complete_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteMaintenanceRequest>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.complete_maintenance(id, request).await?))
}

async fn retire_bus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RetireBusRequest>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.retire(id, request).await?))
}

async fn reactivate_bus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.reactivate(id).await?))
}

async fn out_of_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<OutOfServiceRequest>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = BusController::new(state.pool.clone());
    Ok(Json(controller.mark_out_of_service(id, request).await?))
}

async fn delete_bus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = BusController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Bus eliminado exitosamente"
    })))
}
