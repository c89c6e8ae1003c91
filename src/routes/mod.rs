pub mod bus_routes;
pub mod dashboard_routes;
pub mod insights_routes;
pub mod metrics_routes;
pub mod operation_routes;
pub mod route_routes;
pub mod seed_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;

use crate::state::AppState;

/// Router completo de la aplicación, sin capas de middleware.
pub fn create_app_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api/bus", bus_routes::create_bus_router())
        .nest("/api/route", route_routes::create_route_router())
        .nest("/api/operation", operation_routes::create_operation_router())
        .nest(
            "/api/businessinsights",
            insights_routes::create_insights_router(),
        )
        .nest("/api/dashboard", dashboard_routes::create_dashboard_router())
        .nest("/api/seed", seed_routes::create_seed_router())
        .nest("/metrics", metrics_routes::create_metrics_router())
}

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "fleet-management",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
