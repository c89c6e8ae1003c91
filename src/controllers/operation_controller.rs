use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::operation_dto::{CreateOperationRequest, OperationResponse};
use crate::dto::ApiResponse;
use crate::models::operation::DailyOperation;
use crate::models::value_objects::Money;
use crate::repositories::bus_repository::BusRepository;
use crate::repositories::operation_repository::OperationRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::utils::errors::{not_found_error, AppResult};

pub struct OperationController {
    repository: OperationRepository,
    bus_repository: BusRepository,
    route_repository: RouteRepository,
}

impl OperationController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: OperationRepository::new(pool.clone()),
            bus_repository: BusRepository::new(pool.clone()),
            route_repository: RouteRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateOperationRequest,
    ) -> AppResult<ApiResponse<OperationResponse>> {
        request.validate()?;
        let now = Utc::now();

        // Las referencias son por id: comprobar que existen antes de grabar
        if self.bus_repository.find_by_id(request.bus_id).await?.is_none() {
            return Err(not_found_error("Bus", &request.bus_id.to_string()));
        }
        if self
            .route_repository
            .find_by_id(request.route_id)
            .await?
            .is_none()
        {
            return Err(not_found_error("Route", &request.route_id.to_string()));
        }

        let currency = request.currency.as_deref().unwrap_or("USD");
        let operation = DailyOperation::create(
            request.bus_id,
            request.route_id,
            request.operation_date,
            request.departure_time,
            request.arrival_time,
            request.passenger_count,
            request.fuel_consumed,
            request.distance_traveled,
            request.delay_minutes,
            &request.driver_name,
            Money::create(request.revenue, currency)?,
            Money::create(request.fuel_cost, currency)?,
            request.notes,
            now,
        )?;

        self.repository.create(&operation).await?;

        Ok(ApiResponse::success_with_message(
            OperationResponse::from(&operation),
            "Operación registrada".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<OperationResponse> {
        let operation = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Operation", &id.to_string()))?;
        Ok(OperationResponse::from(&operation))
    }

    /// Operaciones de los últimos `days` días.
    pub async fn list_window(&self, days: i64) -> AppResult<Vec<OperationResponse>> {
        let now = Utc::now();
        let start = (now - Duration::days(days)).date_naive();
        let end = now.date_naive() + Duration::days(1);
        let operations = self.repository.find_by_date_range(start, end).await?;
        Ok(operations.iter().map(OperationResponse::from).collect())
    }

    pub async fn list_by_bus(&self, bus_id: Uuid) -> AppResult<Vec<OperationResponse>> {
        let operations = self.repository.find_by_bus(bus_id).await?;
        Ok(operations.iter().map(OperationResponse::from).collect())
    }

    pub async fn list_by_route(&self, route_id: Uuid) -> AppResult<Vec<OperationResponse>> {
        let operations = self.repository.find_by_route(route_id).await?;
        Ok(operations.iter().map(OperationResponse::from).collect())
    }

    pub async fn list_delayed(&self, min_delay: i32) -> AppResult<Vec<OperationResponse>> {
        let operations = self.repository.find_delayed(min_delay).await?;
        Ok(operations.iter().map(OperationResponse::from).collect())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.delete(id).await
    }
}
