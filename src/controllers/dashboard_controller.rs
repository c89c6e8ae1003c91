use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::dto::dashboard_dto::*;
use crate::repositories::bus_repository::BusRepository;
use crate::repositories::operation_repository::OperationRepository;
use crate::services::dashboard_service;
use crate::utils::errors::AppResult;

pub struct DashboardController {
    bus_repository: BusRepository,
    operation_repository: OperationRepository,
}

impl DashboardController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            bus_repository: BusRepository::new(pool.clone()),
            operation_repository: OperationRepository::new(pool),
        }
    }

    pub async fn kpis(&self) -> AppResult<DashboardKpis> {
        let now = Utc::now();
        let start = (now - Duration::days(30)).date_naive();
        let end = now.date_naive() + Duration::days(1);

        let (buses, operations) = futures::try_join!(
            self.bus_repository.find_all(),
            self.operation_repository.find_by_date_range(start, end),
        )?;

        Ok(dashboard_service::kpis(&buses, &operations, now))
    }

    pub async fn fleet_status(&self) -> AppResult<FleetStatus> {
        let now = Utc::now();
        let today = now.date_naive();

        let (buses, today_operations) = futures::try_join!(
            self.bus_repository.find_all(),
            self.operation_repository
                .find_by_date_range(today, today + Duration::days(1)),
        )?;

        Ok(dashboard_service::fleet_status(&buses, &today_operations, now))
    }

    pub async fn fuel_efficiency_trends(&self, days: i64) -> AppResult<Vec<FuelEfficiencyTrend>> {
        let operations = self.window_operations(days).await?;
        Ok(dashboard_service::fuel_efficiency_trends(&operations))
    }

    pub async fn ridership_trends(&self, days: i64) -> AppResult<Vec<RidershipTrend>> {
        let operations = self.window_operations(days).await?;
        Ok(dashboard_service::ridership_trends(&operations))
    }

    pub async fn cost_analysis(&self, days: i64) -> AppResult<CostAnalysis> {
        let now = Utc::now();
        let window_start = now - Duration::days(days);
        let start = window_start.date_naive();
        let end = now.date_naive() + Duration::days(1);

        let (buses, operations) = futures::try_join!(
            self.bus_repository.find_all(),
            self.operation_repository.find_by_date_range(start, end),
        )?;

        Ok(dashboard_service::cost_analysis(
            &buses,
            &operations,
            window_start,
            days,
        ))
    }

    pub async fn bus_performance(&self, days: i64) -> AppResult<Vec<BusPerformance>> {
        let now = Utc::now();
        let start = (now - Duration::days(days)).date_naive();
        let end = now.date_naive() + Duration::days(1);

        let (buses, operations) = futures::try_join!(
            self.bus_repository.find_all(),
            self.operation_repository.find_by_date_range(start, end),
        )?;

        Ok(dashboard_service::bus_performance(&buses, &operations))
    }

    async fn window_operations(
        &self,
        days: i64,
    ) -> AppResult<Vec<crate::models::operation::DailyOperation>> {
        let now = Utc::now();
        let start = (now - Duration::days(days)).date_naive();
        let end = now.date_naive() + Duration::days(1);
        self.operation_repository.find_by_date_range(start, end).await
    }
}
