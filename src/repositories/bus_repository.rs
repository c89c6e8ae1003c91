//! Repositorio de buses
//!
//! CRUD del agregado Bus con su tabla hija de mantenimientos. Las
//! escrituras que tocan las dos tablas van dentro de una transacción;
//! el rollback es automático si la transacción se suelta sin commit.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::bus::{Bus, BusStatus, MaintenanceRecord};
use crate::models::value_objects::{BusNumber, Money};
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct BusRow {
    id: Uuid,
    bus_number: String,
    model: String,
    year: i32,
    capacity: i32,
    fuel_tank_capacity: Decimal,
    status: String,
    purchase_date: DateTime<Utc>,
    purchase_price_amount: Decimal,
    purchase_price_currency: String,
    current_mileage: i32,
    last_maintenance_date: DateTime<Utc>,
    next_maintenance_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct MaintenanceRecordRow {
    id: Uuid,
    bus_id: Uuid,
    maintenance_date: DateTime<Utc>,
    maintenance_type: String,
    description: String,
    cost_amount: Decimal,
    cost_currency: String,
    mileage_at_maintenance: i32,
    performed_by: String,
    parts_replaced: Option<String>,
    downtime_hours: i32,
    is_warranty: bool,
    created_at: DateTime<Utc>,
}

fn map_record(row: MaintenanceRecordRow) -> AppResult<MaintenanceRecord> {
    let cost = Money::create(row.cost_amount, &row.cost_currency)
        .map_err(|e| AppError::Internal(format!("Corrupt maintenance record row: {}", e)))?;
    Ok(MaintenanceRecord::restore(
        row.id,
        row.bus_id,
        row.maintenance_date,
        row.maintenance_type,
        row.description,
        cost,
        row.mileage_at_maintenance,
        row.performed_by,
        row.parts_replaced,
        row.downtime_hours,
        row.is_warranty,
        row.created_at,
    ))
}

fn map_bus(row: BusRow, records: Vec<MaintenanceRecord>) -> AppResult<Bus> {
    let number = BusNumber::create(&row.bus_number)
        .map_err(|e| AppError::Internal(format!("Corrupt bus row: {}", e)))?;
    let price = Money::create(row.purchase_price_amount, &row.purchase_price_currency)
        .map_err(|e| AppError::Internal(format!("Corrupt bus row: {}", e)))?;
    let status = BusStatus::parse(&row.status)
        .map_err(|e| AppError::Internal(format!("Corrupt bus row: {}", e)))?;

    Ok(Bus::restore(
        row.id,
        number,
        row.model,
        row.year,
        row.capacity,
        row.fuel_tank_capacity,
        status,
        row.purchase_date,
        price,
        row.current_mileage,
        row.last_maintenance_date,
        row.next_maintenance_date,
        records,
        row.created_at,
        row.updated_at,
    ))
}

pub struct BusRepository {
    pool: PgPool,
}

impl BusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, bus: &Bus) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO buses (id, bus_number, model, year, capacity, fuel_tank_capacity,
                               status, purchase_date, purchase_price_amount, purchase_price_currency,
                               current_mileage, last_maintenance_date, next_maintenance_date,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(bus.id())
        .bind(bus.bus_number().value())
        .bind(bus.model())
        .bind(bus.year())
        .bind(bus.capacity())
        .bind(bus.fuel_tank_capacity())
        .bind(bus.status().as_str())
        .bind(bus.purchase_date())
        .bind(bus.purchase_price().amount())
        .bind(bus.purchase_price().currency())
        .bind(bus.current_mileage())
        .bind(bus.last_maintenance_date())
        .bind(bus.next_maintenance_date())
        .bind(bus.created_at())
        .bind(bus.updated_at())
        .execute(&mut *tx)
        .await?;

        insert_new_records(&mut tx, bus).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Persiste el estado actual del agregado, incluidos los registros de
    /// mantenimiento añadidos desde la última carga.
    pub async fn update(&self, bus: &Bus) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE buses
            SET model = $2, year = $3, capacity = $4, fuel_tank_capacity = $5,
                status = $6, current_mileage = $7, last_maintenance_date = $8,
                next_maintenance_date = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(bus.id())
        .bind(bus.model())
        .bind(bus.year())
        .bind(bus.capacity())
        .bind(bus.fuel_tank_capacity())
        .bind(bus.status().as_str())
        .bind(bus.current_mileage())
        .bind(bus.last_maintenance_date())
        .bind(bus.next_maintenance_date())
        .bind(bus.updated_at())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Bus with id '{}' not found",
                bus.id()
            )));
        }

        insert_new_records(&mut tx, bus).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bus>> {
        let row = sqlx::query_as::<_, BusRow>("SELECT * FROM buses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let records = self.load_records(&[row.id]).await?.remove(&row.id);
                Ok(Some(map_bus(row, records.unwrap_or_default())?))
            }
            None => Ok(None),
        }
    }

    pub async fn find_all(&self) -> AppResult<Vec<Bus>> {
        let rows = sqlx::query_as::<_, BusRow>("SELECT * FROM buses ORDER BY bus_number")
            .fetch_all(&self.pool)
            .await?;
        self.attach_records(rows).await
    }

    pub async fn find_by_status(&self, status: BusStatus) -> AppResult<Vec<Bus>> {
        let rows = sqlx::query_as::<_, BusRow>(
            "SELECT * FROM buses WHERE status = $1 ORDER BY bus_number",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        self.attach_records(rows).await
    }

    pub async fn count_by_status(&self, status: BusStatus) -> AppResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM buses WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    pub async fn bus_number_exists(&self, number: &BusNumber) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM buses WHERE bus_number = $1)")
                .bind(number.value())
                .fetch_one(&self.pool)
                .await?;
        Ok(result.0)
    }

    pub async fn count_all(&self) -> AppResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM buses")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Borrado físico; los registros de mantenimiento caen en cascada.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM buses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Bus with id '{}' not found", id)));
        }
        Ok(())
    }

    async fn attach_records(&self, rows: Vec<BusRow>) -> AppResult<Vec<Bus>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut records = self.load_records(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let bus_records = records.remove(&row.id).unwrap_or_default();
                map_bus(row, bus_records)
            })
            .collect()
    }

    async fn load_records(
        &self,
        bus_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<MaintenanceRecord>>> {
        if bus_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, MaintenanceRecordRow>(
            r#"
            SELECT * FROM maintenance_records
            WHERE bus_id = ANY($1)
            ORDER BY maintenance_date
            "#,
        )
        .bind(bus_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<MaintenanceRecord>> = HashMap::new();
        for row in rows {
            let bus_id = row.bus_id;
            grouped.entry(bus_id).or_default().push(map_record(row)?);
        }
        Ok(grouped)
    }
}

/// Inserta los registros del agregado que aún no estén persistidos.
async fn insert_new_records(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    bus: &Bus,
) -> AppResult<()> {
    for record in bus.maintenance_records() {
        sqlx::query(
            r#"
            INSERT INTO maintenance_records (id, bus_id, maintenance_date, maintenance_type,
                                             description, cost_amount, cost_currency,
                                             mileage_at_maintenance, performed_by, parts_replaced,
                                             downtime_hours, is_warranty, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(record.id())
        .bind(record.bus_id())
        .bind(record.maintenance_date())
        .bind(record.maintenance_type())
        .bind(record.description())
        .bind(record.cost().amount())
        .bind(record.cost().currency())
        .bind(record.mileage_at_maintenance())
        .bind(record.performed_by())
        .bind(record.parts_replaced())
        .bind(record.downtime_hours())
        .bind(record.is_warranty())
        .bind(record.created_at())
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
