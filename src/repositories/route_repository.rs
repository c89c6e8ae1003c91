//! Repositorio de rutas

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::route::Route;
use crate::models::value_objects::Money;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct RouteRow {
    id: Uuid,
    route_number: String,
    route_name: String,
    distance: Decimal,
    estimated_duration: i32,
    number_of_stops: i32,
    start_location: String,
    end_location: String,
    is_active: bool,
    estimated_fuel_cost_amount: Decimal,
    estimated_fuel_cost_currency: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

fn map_route(row: RouteRow) -> AppResult<Route> {
    let fuel_cost = Money::create(
        row.estimated_fuel_cost_amount,
        &row.estimated_fuel_cost_currency,
    )
    .map_err(|e| AppError::Internal(format!("Corrupt route row: {}", e)))?;

    Ok(Route::restore(
        row.id,
        row.route_number,
        row.route_name,
        row.distance,
        row.estimated_duration,
        row.number_of_stops,
        row.start_location,
        row.end_location,
        row.is_active,
        fuel_cost,
        row.created_at,
        row.updated_at,
    ))
}

pub struct RouteRepository {
    pool: PgPool,
}

impl RouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, route: &Route) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO routes (id, route_number, route_name, distance, estimated_duration,
                                number_of_stops, start_location, end_location, is_active,
                                estimated_fuel_cost_amount, estimated_fuel_cost_currency,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(route.id())
        .bind(route.route_number())
        .bind(route.route_name())
        .bind(route.distance())
        .bind(route.estimated_duration())
        .bind(route.number_of_stops())
        .bind(route.start_location())
        .bind(route.end_location())
        .bind(route.is_active())
        .bind(route.estimated_fuel_cost().amount())
        .bind(route.estimated_fuel_cost().currency())
        .bind(route.created_at())
        .bind(route.updated_at())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&self, route: &Route) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE routes
            SET route_name = $2, distance = $3, estimated_duration = $4, number_of_stops = $5,
                start_location = $6, end_location = $7, is_active = $8,
                estimated_fuel_cost_amount = $9, estimated_fuel_cost_currency = $10,
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(route.id())
        .bind(route.route_name())
        .bind(route.distance())
        .bind(route.estimated_duration())
        .bind(route.number_of_stops())
        .bind(route.start_location())
        .bind(route.end_location())
        .bind(route.is_active())
        .bind(route.estimated_fuel_cost().amount())
        .bind(route.estimated_fuel_cost().currency())
        .bind(route.updated_at())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Route with id '{}' not found",
                route.id()
            )));
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Route>> {
        let row = sqlx::query_as::<_, RouteRow>("SELECT * FROM routes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(map_route).transpose()
    }

    pub async fn find_all(&self) -> AppResult<Vec<Route>> {
        let rows = sqlx::query_as::<_, RouteRow>("SELECT * FROM routes ORDER BY route_number")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(map_route).collect()
    }

    pub async fn find_active(&self) -> AppResult<Vec<Route>> {
        let rows = sqlx::query_as::<_, RouteRow>(
            "SELECT * FROM routes WHERE is_active = TRUE ORDER BY route_number",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_route).collect()
    }

    pub async fn route_number_exists(&self, route_number: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM routes WHERE route_number = $1)")
                .bind(route_number)
                .fetch_one(&self.pool)
                .await?;
        Ok(result.0)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM routes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Route with id '{}' not found",
                id
            )));
        }
        Ok(())
    }
}
