use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::seed_controller::{SeedController, SeedResult};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_seed_router() -> Router<AppState> {
    Router::new().route("/mock-data", post(seed_mock_data))
}

async fn seed_mock_data(
    State(state): State<AppState>,
) -> Result<Json<SeedResult>, AppError> {
    let controller = SeedController::new(state.pool.clone());
    Ok(Json(controller.seed_mock_data().await?))
}
