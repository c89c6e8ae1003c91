//! DTOs de Bus

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::bus::Bus;

/// Request para dar de alta un bus
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBusRequest {
    #[validate(length(min = 3, max = 20))]
    pub bus_number: String,

    #[validate(length(min = 2, max = 100))]
    pub model: String,

    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,

    pub capacity: i32,

    pub fuel_tank_capacity: Decimal,

    pub purchase_date: DateTime<Utc>,

    pub purchase_price: Decimal,

    pub currency: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMileageRequest {
    pub new_mileage: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleMaintenanceRequest {
    pub maintenance_date: DateTime<Utc>,

    #[validate(length(min = 2, max = 50))]
    pub maintenance_type: String,

    #[validate(length(min = 2, max = 500))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteMaintenanceRequest {
    pub cost: Decimal,

    #[validate(length(min = 2, max = 100))]
    pub performed_by: String,

    pub parts_replaced: Option<String>,

    pub downtime_hours: i32,
}

#[derive(Debug, Deserialize)]
pub struct RetireBusRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct OutOfServiceRequest {
    pub reason: String,
}

/// Response de bus para la API
#[derive(Debug, Serialize)]
pub struct BusResponse {
    pub id: String,
    pub bus_number: String,
    pub model: String,
    pub year: i32,
    pub capacity: i32,
    pub fuel_tank_capacity: Decimal,
    pub status: String,
    pub purchase_date: DateTime<Utc>,
    pub purchase_price: Decimal,
    pub purchase_currency: String,
    pub current_mileage: i32,
    pub last_maintenance_date: DateTime<Utc>,
    pub next_maintenance_date: DateTime<Utc>,
    pub days_until_maintenance: i32,
    pub requires_maintenance: bool,
}

impl BusResponse {
    pub fn from_domain(bus: &Bus, now: DateTime<Utc>) -> Self {
        Self {
            id: bus.id().to_string(),
            bus_number: bus.bus_number().value().to_string(),
            model: bus.model().to_string(),
            year: bus.year(),
            capacity: bus.capacity(),
            fuel_tank_capacity: bus.fuel_tank_capacity(),
            status: bus.status().as_str().to_string(),
            purchase_date: bus.purchase_date(),
            purchase_price: bus.purchase_price().amount(),
            purchase_currency: bus.purchase_price().currency().to_string(),
            current_mileage: bus.current_mileage(),
            last_maintenance_date: bus.last_maintenance_date(),
            next_maintenance_date: bus.next_maintenance_date(),
            days_until_maintenance: bus.days_until_maintenance(now),
            requires_maintenance: bus.requires_maintenance(now),
        }
    }
}

/// Registro de mantenimiento en responses
#[derive(Debug, Serialize)]
pub struct MaintenanceRecordResponse {
    pub id: String,
    pub maintenance_date: DateTime<Utc>,
    pub maintenance_type: String,
    pub description: String,
    pub cost: Decimal,
    pub cost_currency: String,
    pub mileage_at_maintenance: i32,
    pub performed_by: String,
    pub parts_replaced: Option<String>,
    pub downtime_hours: i32,
    pub is_warranty: bool,
}

impl From<&crate::models::bus::MaintenanceRecord> for MaintenanceRecordResponse {
    fn from(record: &crate::models::bus::MaintenanceRecord) -> Self {
        Self {
            id: record.id().to_string(),
            maintenance_date: record.maintenance_date(),
            maintenance_type: record.maintenance_type().to_string(),
            description: record.description().to_string(),
            cost: record.cost().amount(),
            cost_currency: record.cost().currency().to_string(),
            mileage_at_maintenance: record.mileage_at_maintenance(),
            performed_by: record.performed_by().to_string(),
            parts_replaced: record.parts_replaced().map(str::to_string),
            downtime_hours: record.downtime_hours(),
            is_warranty: record.is_warranty(),
        }
    }
}

/// Estadísticas globales de la flota
#[derive(Debug, Serialize)]
pub struct FleetStatisticsResponse {
    pub total_buses: i64,
    pub active_buses: i64,
    pub in_maintenance: i64,
    pub retired: i64,
    pub requires_maintenance: i64,
}
