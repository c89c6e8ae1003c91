use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::route_dto::{CreateRouteRequest, RouteResponse, UpdateFuelCostRequest};
use crate::dto::ApiResponse;
use crate::models::route::Route;
use crate::models::value_objects::Money;
use crate::repositories::route_repository::RouteRepository;
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

pub struct RouteController {
    repository: RouteRepository,
}

impl RouteController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: RouteRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateRouteRequest,
    ) -> AppResult<ApiResponse<RouteResponse>> {
        request.validate()?;
        let now = Utc::now();

        if self
            .repository
            .route_number_exists(&request.route_number)
            .await?
        {
            return Err(conflict_error("Route", "number", &request.route_number));
        }

        let fuel_cost = Money::create(
            request.estimated_fuel_cost,
            request.currency.as_deref().unwrap_or("USD"),
        )?;

        let route = Route::create(
            &request.route_number,
            &request.route_name,
            request.distance,
            request.estimated_duration,
            request.number_of_stops,
            &request.start_location,
            &request.end_location,
            fuel_cost,
            now,
        )?;

        self.repository.create(&route).await?;
        tracing::info!("Ruta creada: {}", route.route_number());

        Ok(ApiResponse::success_with_message(
            RouteResponse::from(&route),
            "Ruta creada exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<RouteResponse> {
        let route = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Route", &id.to_string()))?;
        Ok(RouteResponse::from(&route))
    }

    pub async fn list(&self, only_active: bool) -> AppResult<Vec<RouteResponse>> {
        let routes = if only_active {
            self.repository.find_active().await?
        } else {
            self.repository.find_all().await?
        };
        Ok(routes.iter().map(RouteResponse::from).collect())
    }

    pub async fn activate(&self, id: Uuid) -> AppResult<ApiResponse<RouteResponse>> {
        let now = Utc::now();
        let mut route = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Route", &id.to_string()))?;
        route.activate(now)?;
        self.repository.update(&route).await?;
        Ok(ApiResponse::success(RouteResponse::from(&route)))
    }

    pub async fn deactivate(&self, id: Uuid) -> AppResult<ApiResponse<RouteResponse>> {
        let now = Utc::now();
        let mut route = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Route", &id.to_string()))?;
        route.deactivate(now)?;
        self.repository.update(&route).await?;
        Ok(ApiResponse::success(RouteResponse::from(&route)))
    }

    pub async fn update_fuel_cost(
        &self,
        id: Uuid,
        request: UpdateFuelCostRequest,
    ) -> AppResult<ApiResponse<RouteResponse>> {
        request.validate()?;
        let now = Utc::now();
        let mut route = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Route", &id.to_string()))?;

        let cost = Money::create(
            request.estimated_fuel_cost,
            request.currency.as_deref().unwrap_or("USD"),
        )?;
        route.update_estimated_fuel_cost(cost, now);
        self.repository.update(&route).await?;

        Ok(ApiResponse::success(RouteResponse::from(&route)))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.delete(id).await
    }
}
