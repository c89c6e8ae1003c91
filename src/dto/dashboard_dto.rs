//! DTOs del dashboard

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DashboardKpis {
    pub total_buses: usize,
    pub active_buses: usize,
    pub total_operations_last_30_days: usize,
    pub total_passengers_last_30_days: i64,
    pub total_revenue_last_30_days: Decimal,
    pub total_fuel_cost_last_30_days: Decimal,
    pub net_profit_last_30_days: Decimal,
    pub average_fuel_efficiency_mpg: Decimal,
    pub on_time_percentage: Decimal,
    pub total_distance_miles: Decimal,
    pub buses_requiring_maintenance: usize,
}

#[derive(Debug, Serialize)]
pub struct FleetStatus {
    pub timestamp: DateTime<Utc>,
    pub total_buses: usize,
    pub active_buses: usize,
    pub in_maintenance: usize,
    pub out_of_service: usize,
    pub retired: usize,
    pub operations_today: usize,
    pub passengers_today: i64,
    pub delays_today: usize,
    pub average_delay_minutes: Decimal,
}

#[derive(Debug, Serialize)]
pub struct FuelEfficiencyTrend {
    pub date: NaiveDate,
    pub average_mpg: Decimal,
    pub total_distance: Decimal,
    pub total_fuel_consumed: Decimal,
    pub operation_count: usize,
}

#[derive(Debug, Serialize)]
pub struct RidershipTrend {
    pub date: NaiveDate,
    pub total_passengers: i64,
    pub total_operations: usize,
    pub average_passengers_per_trip: Decimal,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CostAnalysis {
    pub period: String,
    pub total_revenue: Decimal,
    pub total_fuel_cost: Decimal,
    pub total_maintenance_cost: Decimal,
    pub total_operating_cost: Decimal,
    pub net_profit: Decimal,
    pub profit_margin: Decimal,
    pub fuel_cost_per_mile: Decimal,
    pub cost_per_passenger: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BusPerformance {
    pub bus_id: String,
    pub bus_number: String,
    pub total_operations: usize,
    pub total_passengers: i64,
    pub total_distance: Decimal,
    pub average_fuel_efficiency: Decimal,
    pub total_revenue: Decimal,
    pub total_fuel_cost: Decimal,
    pub average_delay_minutes: Decimal,
    pub on_time_percentage: Decimal,
}
