use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::PgPool;

use crate::dto::insights_dto::*;
use crate::models::bus::Bus;
use crate::models::operation::DailyOperation;
use crate::models::route::Route;
use crate::repositories::bus_repository::BusRepository;
use crate::repositories::operation_repository::OperationRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::services::ai_service::{roi_narrative_prompt, AiAnalysisService};
use crate::services::insights_service;
use crate::utils::errors::AppResult;

/// Snapshot de la ventana sobre el que corren todos los reportes.
struct Snapshot {
    operations: Vec<DailyOperation>,
    buses: Vec<Bus>,
    routes: Vec<Route>,
}

pub struct InsightsController {
    operation_repository: OperationRepository,
    bus_repository: BusRepository,
    route_repository: RouteRepository,
}

impl InsightsController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            operation_repository: OperationRepository::new(pool.clone()),
            bus_repository: BusRepository::new(pool.clone()),
            route_repository: RouteRepository::new(pool),
        }
    }

    async fn load_snapshot(&self, days: i64, now: DateTime<Utc>) -> AppResult<Snapshot> {
        let start: NaiveDate = (now - Duration::days(days)).date_naive();
        let end = now.date_naive() + Duration::days(1);

        let (operations, buses, routes) = futures::try_join!(
            self.operation_repository.find_by_date_range(start, end),
            self.bus_repository.find_all(),
            self.route_repository.find_all(),
        )?;

        Ok(Snapshot {
            operations,
            buses,
            routes,
        })
    }

    pub async fn fuel_wasters(&self, days: i64) -> AppResult<FuelWasterAnalysis> {
        let snapshot = self.load_snapshot(days, Utc::now()).await?;
        Ok(insights_service::fuel_wasters(
            &snapshot.operations,
            &snapshot.buses,
            days,
        ))
    }

    pub async fn empty_buses(&self, days: i64) -> AppResult<EmptyBusAnalysis> {
        let snapshot = self.load_snapshot(days, Utc::now()).await?;
        Ok(insights_service::empty_buses(
            &snapshot.operations,
            &snapshot.routes,
            &snapshot.buses,
            days,
        ))
    }

    pub async fn driver_performance(&self, days: i64) -> AppResult<DriverPerformanceAnalysis> {
        let snapshot = self.load_snapshot(days, Utc::now()).await?;
        Ok(insights_service::driver_performance(
            &snapshot.operations,
            days,
        ))
    }

    pub async fn maintenance_alerts(&self) -> AppResult<MaintenanceAlertAnalysis> {
        let buses = self.bus_repository.find_all().await?;
        Ok(insights_service::maintenance_alerts(&buses, Utc::now()))
    }

    pub async fn route_optimization(&self, days: i64) -> AppResult<RouteOptimizationAnalysis> {
        let snapshot = self.load_snapshot(days, Utc::now()).await?;
        Ok(insights_service::route_optimization(
            &snapshot.operations,
            &snapshot.routes,
            days,
        ))
    }

    pub async fn roi_summary(&self, days: i64) -> AppResult<RoiSummary> {
        let now = Utc::now();
        let snapshot = self.load_snapshot(days, now).await?;
        Ok(insights_service::roi_summary(
            &snapshot.operations,
            &snapshot.buses,
            &snapshot.routes,
            days,
            now,
        ))
    }

    /// Resumen narrativo del ROI vía el servicio externo de texto.
    pub async fn narrative(
        &self,
        days: i64,
        ai: &dyn AiAnalysisService,
    ) -> AppResult<NarrativeResponse> {
        let summary = self.roi_summary(days).await?;
        let narrative = ai.generate_narrative(&roi_narrative_prompt(&summary)).await?;
        Ok(NarrativeResponse {
            period: summary.period,
            narrative,
        })
    }
}
