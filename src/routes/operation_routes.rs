use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::operation_controller::OperationController;
use crate::dto::operation_dto::{CreateOperationRequest, DelayedFilter, OperationResponse};
use crate::dto::{ApiResponse, ReportWindow};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_operation_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_operation).get(list_operations))
        .route("/delayed", get(delayed_operations))
        .route("/bus/:bus_id", get(operations_by_bus))
        .route("/route/:route_id", get(operations_by_route))
        .route("/:id", get(get_operation).delete(delete_operation))
}

async fn create_operation(
    State(state): State<AppState>,
    Json(request): Json<CreateOperationRequest>,
) -> Result<Json<ApiResponse<OperationResponse>>, AppError> {
    let controller = OperationController::new(state.pool.clone());
    Ok(Json(controller.create(request).await?))
}

async fn list_operations(
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<Vec<OperationResponse>>, AppError> {
    let controller = OperationController::new(state.pool.clone());
    Ok(Json(controller.list_window(window.days_or_default()).await?))
}

async fn get_operation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OperationResponse>, AppError> {
    let controller = OperationController::new(state.pool.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn operations_by_bus(
    State(state): State<AppState>,
    Path(bus_id): Path<Uuid>,
) -> Result<Json<Vec<OperationResponse>>, AppError> {
    let controller = OperationController::new(state.pool.clone());
    Ok(Json(controller.list_by_bus(bus_id).await?))
}

async fn operations_by_route(
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<Vec<OperationResponse>>, AppError> {
    let controller = OperationController::new(state.pool.clone());
    Ok(Json(controller.list_by_route(route_id).await?))
}

async fn delayed_operations(
    State(state): State<AppState>,
    Query(filter): Query<DelayedFilter>,
) -> Result<Json<Vec<OperationResponse>>, AppError> {
    let controller = OperationController::new(state.pool.clone());
    Ok(Json(
        controller.list_delayed(filter.min_delay.unwrap_or(15)).await?,
    ))
}

async fn delete_operation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = OperationController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Operación eliminada exitosamente"
    })))
}
