use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::bus_dto::{
    BusResponse, CompleteMaintenanceRequest, CreateBusRequest, FleetStatisticsResponse,
    MaintenanceRecordResponse, OutOfServiceRequest, RetireBusRequest, ScheduleMaintenanceRequest,
    UpdateMileageRequest,
};
use crate::dto::ApiResponse;
use crate::models::bus::{Bus, BusStatus};
use crate::models::value_objects::{BusNumber, Money};
use crate::repositories::bus_repository::BusRepository;
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};

pub struct BusController {
    repository: BusRepository,
}

impl BusController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BusRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateBusRequest,
    ) -> AppResult<ApiResponse<BusResponse>> {
        request.validate()?;
        let now = Utc::now();

        let bus_number = BusNumber::create(&request.bus_number)?;
        if self.repository.bus_number_exists(&bus_number).await? {
            return Err(conflict_error("Bus", "number", bus_number.value()));
        }

        let price = Money::create(
            request.purchase_price,
            request.currency.as_deref().unwrap_or("USD"),
        )?;

        let (bus, event) = Bus::create(
            bus_number,
            &request.model,
            request.year,
            request.capacity,
            request.fuel_tank_capacity,
            request.purchase_date,
            price,
            now,
        )?;

        self.repository.create(&bus).await?;
        tracing::info!("Bus creado: {:?}", event);

        Ok(ApiResponse::success_with_message(
            BusResponse::from_domain(&bus, now),
            "Bus creado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BusResponse> {
        let bus = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Bus", &id.to_string()))?;
        Ok(BusResponse::from_domain(&bus, Utc::now()))
    }

    pub async fn list(&self) -> AppResult<Vec<BusResponse>> {
        let now = Utc::now();
        let buses = self.repository.find_all().await?;
        Ok(buses
            .iter()
            .map(|b| BusResponse::from_domain(b, now))
            .collect())
    }

    pub async fn list_by_status(&self, status: &str) -> AppResult<Vec<BusResponse>> {
        let status = BusStatus::parse(status).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let now = Utc::now();
        let buses = self.repository.find_by_status(status).await?;
        Ok(buses
            .iter()
            .map(|b| BusResponse::from_domain(b, now))
            .collect())
    }

    pub async fn list_requiring_maintenance(&self) -> AppResult<Vec<BusResponse>> {
        let now = Utc::now();
        let buses = self.repository.find_all().await?;
        Ok(buses
            .iter()
            .filter(|b| b.requires_maintenance(now))
            .map(|b| BusResponse::from_domain(b, now))
            .collect())
    }

    pub async fn maintenance_history(
        &self,
        id: Uuid,
    ) -> AppResult<Vec<MaintenanceRecordResponse>> {
        let bus = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Bus", &id.to_string()))?;
        Ok(bus
            .maintenance_records()
            .iter()
            .map(MaintenanceRecordResponse::from)
            .collect())
    }

    pub async fn statistics(&self) -> AppResult<FleetStatisticsResponse> {
        let now = Utc::now();
        let (active, maintenance, retired, buses) = futures::try_join!(
            self.repository.count_by_status(BusStatus::Active),
            self.repository.count_by_status(BusStatus::Maintenance),
            self.repository.count_by_status(BusStatus::Retired),
            self.repository.find_all(),
        )?;

        Ok(FleetStatisticsResponse {
            total_buses: buses.len() as i64,
            active_buses: active,
            in_maintenance: maintenance,
            retired,
            requires_maintenance: buses
                .iter()
                .filter(|b| b.requires_maintenance(now))
                .count() as i64,
        })
    }

    pub async fn update_mileage(
        &self,
        id: Uuid,
        request: UpdateMileageRequest,
    ) -> AppResult<ApiResponse<BusResponse>> {
        let now = Utc::now();
        let mut bus = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Bus", &id.to_string()))?;

        if let Some(event) = bus.update_mileage(request.new_mileage, now)? {
            // El aviso se publica como log estructurado; no hay bus de eventos
            tracing::warn!("Mantenimiento requerido: {:?}", event);
        }

        self.repository.update(&bus).await?;
        Ok(ApiResponse::success(BusResponse::from_domain(&bus, now)))
    }

    pub async fn schedule_maintenance(
        &self,
        id: Uuid,
        request: ScheduleMaintenanceRequest,
    ) -> AppResult<ApiResponse<BusResponse>> {
        request.validate()?;
        let now = Utc::now();
        let mut bus = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Bus", &id.to_string()))?;

        let event = bus.schedule_maintenance(
            request.maintenance_date,
            &request.maintenance_type,
            &request.description,
            now,
        )?;
        self.repository.update(&bus).await?;
        tracing::info!("Mantenimiento programado: {:?}", event);

        Ok(ApiResponse::success_with_message(
            BusResponse::from_domain(&bus, now),
            "Mantenimiento programado".to_string(),
        ))
    }

    pub async fn complete_maintenance(
        &self,
        id: Uuid,
        request: CompleteMaintenanceRequest,
    ) -> AppResult<ApiResponse<BusResponse>> {
        request.validate()?;
        let now = Utc::now();
        let mut bus = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Bus", &id.to_string()))?;

        let cost = Money::usd(request.cost)?;
        let event = bus.complete_maintenance(
            cost,
            &request.performed_by,
            request.parts_replaced,
            request.downtime_hours,
            now,
        )?;
        self.repository.update(&bus).await?;
        tracing::info!("Mantenimiento completado: {:?}", event);

        Ok(ApiResponse::success_with_message(
            BusResponse::from_domain(&bus, now),
            "Mantenimiento completado".to_string(),
        ))
    }

    pub async fn retire(
        &self,
        id: Uuid,
        request: RetireBusRequest,
    ) -> AppResult<ApiResponse<BusResponse>> {
        let now = Utc::now();
        let mut bus = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Bus", &id.to_string()))?;

        let event = bus.retire(&request.reason, now)?;
        self.repository.update(&bus).await?;
        tracing::info!("Bus retirado: {:?}", event);

        Ok(ApiResponse::success_with_message(
            BusResponse::from_domain(&bus, now),
            "Bus retirado".to_string(),
        ))
    }

    pub async fn reactivate(&self, id: Uuid) -> AppResult<ApiResponse<BusResponse>> {
        let now = Utc::now();
        let mut bus = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Bus", &id.to_string()))?;

        bus.reactivate(now)?;
        self.repository.update(&bus).await?;

        Ok(ApiResponse::success_with_message(
            BusResponse::from_domain(&bus, now),
            "Bus reactivado".to_string(),
        ))
    }

    pub async fn mark_out_of_service(
        &self,
        id: Uuid,
        request: OutOfServiceRequest,
    ) -> AppResult<ApiResponse<BusResponse>> {
        let now = Utc::now();
        let mut bus = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Bus", &id.to_string()))?;

        let event = bus.mark_out_of_service(&request.reason, now)?;
        self.repository.update(&bus).await?;
        tracing::warn!("Bus fuera de servicio: {:?}", event);

        Ok(ApiResponse::success_with_message(
            BusResponse::from_domain(&bus, now),
            "Bus marcado fuera de servicio".to_string(),
        ))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.delete(id).await
    }
}
