use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::route_controller::RouteController;
use crate::dto::route_dto::{CreateRouteRequest, RouteResponse, UpdateFuelCostRequest};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_route_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_route).get(list_routes))
        .route(
            "/:id",
            get(get_route).put(update_fuel_cost).delete(delete_route),
        )
        .route("/:id/activate", post(activate_route))
        .route("/:id/deactivate", post(deactivate_route))
}

#[derive(Debug, Deserialize)]
struct RouteListFilter {
    active: Option<bool>,
}

async fn create_route(
    State(state): State<AppState>,
    Json(request): Json<CreateRouteRequest>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    let controller = RouteController::new(state.pool.clone());
    Ok(Json(controller.create(request).await?))
}

async fn list_routes(
    State(state): State<AppState>,
    Query(filter): Query<RouteListFilter>,
) -> Result<Json<Vec<RouteResponse>>, AppError> {
    let controller = RouteController::new(state.pool.clone());
    Ok(Json(controller.list(filter.active.unwrap_or(false)).await?))
}

async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RouteResponse>, AppError> {
    let controller = RouteController::new(state.pool.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_fuel_cost(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateFuelCostRequest>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    let controller = RouteController::new(state.pool.clone());
    Ok(Json(controller.update_fuel_cost(id, request).await?))
}

async fn activate_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    let controller = RouteController::new(state.pool.clone());
    Ok(Json(controller.activate(id).await?))
}

async fn deactivate_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    let controller = RouteController::new(state.pool.clone());
    Ok(Json(controller.deactivate(id).await?))
}

async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = RouteController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Ruta eliminada exitosamente"
    })))
}
