//! Repositorio de operaciones diarias
//!
//! Las consultas por rango de fechas usan intervalo semiabierto
//! [start, end): todo lo que necesitan los reportes.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::operation::DailyOperation;
use crate::models::value_objects::Money;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct OperationRow {
    id: Uuid,
    bus_id: Uuid,
    route_id: Uuid,
    operation_date: NaiveDate,
    departure_time: NaiveTime,
    arrival_time: NaiveTime,
    passenger_count: i32,
    fuel_consumed: Decimal,
    distance_traveled: Decimal,
    delay_minutes: i32,
    driver_name: String,
    revenue_amount: Decimal,
    revenue_currency: String,
    fuel_cost_amount: Decimal,
    fuel_cost_currency: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

fn map_operation(row: OperationRow) -> AppResult<DailyOperation> {
    let revenue = Money::create(row.revenue_amount, &row.revenue_currency)
        .map_err(|e| AppError::Internal(format!("Corrupt operation row: {}", e)))?;
    let fuel_cost = Money::create(row.fuel_cost_amount, &row.fuel_cost_currency)
        .map_err(|e| AppError::Internal(format!("Corrupt operation row: {}", e)))?;

    Ok(DailyOperation::restore(
        row.id,
        row.bus_id,
        row.route_id,
        row.operation_date,
        row.departure_time,
        row.arrival_time,
        row.passenger_count,
        row.fuel_consumed,
        row.distance_traveled,
        row.delay_minutes,
        row.driver_name,
        revenue,
        fuel_cost,
        row.notes,
        row.created_at,
    ))
}

pub struct OperationRepository {
    pool: PgPool,
}

impl OperationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, operation: &DailyOperation) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_operations (id, bus_id, route_id, operation_date, departure_time,
                                          arrival_time, passenger_count, fuel_consumed,
                                          distance_traveled, delay_minutes, driver_name,
                                          revenue_amount, revenue_currency, fuel_cost_amount,
                                          fuel_cost_currency, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(operation.id())
        .bind(operation.bus_id())
        .bind(operation.route_id())
        .bind(operation.operation_date())
        .bind(operation.departure_time())
        .bind(operation.arrival_time())
        .bind(operation.passenger_count())
        .bind(operation.fuel_consumed())
        .bind(operation.distance_traveled())
        .bind(operation.delay_minutes())
        .bind(operation.driver_name())
        .bind(operation.revenue().amount())
        .bind(operation.revenue().currency())
        .bind(operation.fuel_cost().amount())
        .bind(operation.fuel_cost().currency())
        .bind(operation.notes())
        .bind(operation.created_at())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DailyOperation>> {
        let row = sqlx::query_as::<_, OperationRow>("SELECT * FROM daily_operations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(map_operation).transpose()
    }

    pub async fn find_by_bus(&self, bus_id: Uuid) -> AppResult<Vec<DailyOperation>> {
        let rows = sqlx::query_as::<_, OperationRow>(
            r#"
            SELECT * FROM daily_operations
            WHERE bus_id = $1
            ORDER BY operation_date DESC, departure_time DESC
            "#,
        )
        .bind(bus_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_operation).collect()
    }

    pub async fn find_by_route(&self, route_id: Uuid) -> AppResult<Vec<DailyOperation>> {
        let rows = sqlx::query_as::<_, OperationRow>(
            r#"
            SELECT * FROM daily_operations
            WHERE route_id = $1
            ORDER BY operation_date DESC, departure_time DESC
            "#,
        )
        .bind(route_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_operation).collect()
    }

    /// Operaciones en [start, end).
    pub async fn find_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DailyOperation>> {
        let rows = sqlx::query_as::<_, OperationRow>(
            r#"
            SELECT * FROM daily_operations
            WHERE operation_date >= $1 AND operation_date < $2
            ORDER BY operation_date, departure_time
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_operation).collect()
    }

    pub async fn find_delayed(&self, min_delay_minutes: i32) -> AppResult<Vec<DailyOperation>> {
        let rows = sqlx::query_as::<_, OperationRow>(
            r#"
            SELECT * FROM daily_operations
            WHERE delay_minutes >= $1
            ORDER BY delay_minutes DESC
            "#,
        )
        .bind(min_delay_minutes)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_operation).collect()
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM daily_operations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Operation with id '{}' not found",
                id
            )));
        }
        Ok(())
    }
}
