use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;

use crate::repositories::bus_repository::BusRepository;
use crate::repositories::operation_repository::OperationRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::services::seed_service;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct SeedResult {
    pub success: bool,
    pub message: String,
    pub buses_created: usize,
    pub routes_created: usize,
    pub operations_created: usize,
    pub maintenance_records_created: usize,
}

pub struct SeedController {
    bus_repository: BusRepository,
    route_repository: RouteRepository,
    operation_repository: OperationRepository,
}

impl SeedController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            bus_repository: BusRepository::new(pool.clone()),
            route_repository: RouteRepository::new(pool.clone()),
            operation_repository: OperationRepository::new(pool),
        }
    }

    /// Puebla la base con la flota de prueba. Rechaza ejecutarse sobre una
    /// base que ya tiene datos.
    pub async fn seed_mock_data(&self) -> AppResult<SeedResult> {
        if self.bus_repository.count_all().await? > 0 {
            return Err(AppError::Conflict(
                "Database already contains data. Clear database first".to_string(),
            ));
        }

        let now = Utc::now();
        // thread_rng no es Send: limitar su vida antes de los awaits
        let data = {
            let mut rng = rand::thread_rng();
            seed_service::generate(&mut rng, now)?
        };

        log::info!(
            "🌱 Sembrando datos de prueba: {} buses, {} rutas, {} operaciones",
            data.buses.len(),
            data.routes.len(),
            data.operations.len()
        );

        for bus in &data.buses {
            self.bus_repository.create(bus).await?;
        }
        for route in &data.routes {
            self.route_repository.create(route).await?;
        }
        for operation in &data.operations {
            self.operation_repository.create(operation).await?;
        }

        tracing::info!("🎉 Base de datos sembrada");

        Ok(SeedResult {
            success: true,
            message: "Database seeded successfully with realistic mock data".to_string(),
            buses_created: data.buses.len(),
            routes_created: data.routes.len(),
            operations_created: data.operations.len(),
            maintenance_records_created: data.maintenance_record_count,
        })
    }
}
