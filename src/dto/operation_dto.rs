//! DTOs de DailyOperation

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::operation::DailyOperation;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOperationRequest {
    pub bus_id: Uuid,
    pub route_id: Uuid,
    pub operation_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub passenger_count: i32,
    pub fuel_consumed: Decimal,
    pub distance_traveled: Decimal,
    pub delay_minutes: i32,

    #[validate(length(min = 2, max = 100))]
    pub driver_name: String,

    pub revenue: Decimal,
    pub fuel_cost: Decimal,
    pub currency: Option<String>,
    pub notes: Option<String>,
}

/// Filtros para listar operaciones retrasadas
#[derive(Debug, Deserialize)]
pub struct DelayedFilter {
    pub min_delay: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct OperationResponse {
    pub id: String,
    pub bus_id: String,
    pub route_id: String,
    pub operation_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub passenger_count: i32,
    pub fuel_consumed: Decimal,
    pub distance_traveled: Decimal,
    pub delay_minutes: i32,
    pub driver_name: String,
    pub revenue: Decimal,
    pub revenue_currency: String,
    pub fuel_cost: Decimal,
    pub fuel_cost_currency: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&DailyOperation> for OperationResponse {
    fn from(op: &DailyOperation) -> Self {
        Self {
            id: op.id().to_string(),
            bus_id: op.bus_id().to_string(),
            route_id: op.route_id().to_string(),
            operation_date: op.operation_date(),
            departure_time: op.departure_time(),
            arrival_time: op.arrival_time(),
            passenger_count: op.passenger_count(),
            fuel_consumed: op.fuel_consumed(),
            distance_traveled: op.distance_traveled(),
            delay_minutes: op.delay_minutes(),
            driver_name: op.driver_name().to_string(),
            revenue: op.revenue().amount(),
            revenue_currency: op.revenue().currency().to_string(),
            fuel_cost: op.fuel_cost().amount(),
            fuel_cost_currency: op.fuel_cost().currency().to_string(),
            notes: op.notes().map(str::to_string),
            created_at: op.created_at(),
        }
    }
}
