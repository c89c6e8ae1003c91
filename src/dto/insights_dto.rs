//! DTOs de los reportes de negocio
//!
//! Resúmenes producidos por `services::insights_service`. Siempre se
//! devuelven completos (posiblemente vacíos); no tienen ruta de error.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

// Problema 1: combustible desperdiciado
#[derive(Debug, Serialize)]
pub struct FuelWasterAnalysis {
    pub period: String,
    pub fleet_average_mpg: Decimal,
    pub top_wasters: Vec<FuelWaster>,
    pub total_wasted_this_period: Decimal,
    pub annualized_total_waste: Decimal,
    pub potential_savings: Decimal,
}

#[derive(Debug, Serialize)]
pub struct FuelWaster {
    pub bus_number: String,
    pub actual_mpg: Decimal,
    pub target_mpg: Decimal,
    pub percent_worse: Decimal,
    pub wasted_cost_this_period: Decimal,
    pub annualized_waste: Decimal,
    pub action_required: String,
}

// Problema 2: buses vacíos / sobrellenos
#[derive(Debug, Serialize)]
pub struct EmptyBusAnalysis {
    pub period: String,
    pub wasteful_routes: Vec<WastefulRoute>,
    pub overcrowded_routes: Vec<OvercrowdedRoute>,
    pub total_wasted_this_period: Decimal,
    pub annualized_waste: Decimal,
    pub potential_revenue_loss: Decimal,
    pub net_opportunity: Decimal,
}

#[derive(Debug, Serialize)]
pub struct WastefulRoute {
    pub route_number: String,
    pub time_slot: String,
    pub average_passengers: i32,
    pub occupancy_percent: Decimal,
    pub trips_per_period: usize,
    pub wasted_cost: Decimal,
    pub recommendation: String,
    pub annual_savings_if_cancelled: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OvercrowdedRoute {
    pub route_number: String,
    pub time_slot: String,
    pub average_passengers: i32,
    pub occupancy_percent: Decimal,
    pub lost_revenue_estimate: Decimal,
    pub recommendation: String,
}

// Problema 3: hábitos de conducción
#[derive(Debug, Serialize)]
pub struct DriverPerformanceAnalysis {
    pub period: String,
    pub fleet_average_mpg: Decimal,
    pub fleet_average_delay: Decimal,
    pub top_performers: Vec<DriverScore>,
    pub poor_performers: Vec<DriverScore>,
    pub total_excess_cost_this_period: Decimal,
    pub annualized_excess_cost: Decimal,
    pub potential_savings: Decimal,
    pub drivers_needing_training: usize,
}

#[derive(Debug, Serialize, Clone)]
pub struct DriverScore {
    pub driver_name: String,
    pub performance_score: Decimal,
    pub mpg: Decimal,
    pub average_delay_minutes: Decimal,
    pub trip_count: usize,
    pub excess_cost_this_period: Decimal,
    pub annualized_excess_cost: Decimal,
    pub status: String,
}

// Problema 4: mantenimiento
#[derive(Debug, Serialize)]
pub struct MaintenanceAlertAnalysis {
    pub urgent_alerts: Vec<MaintenanceAlert>,
    pub upcoming_maintenance: Vec<MaintenanceAlert>,
    pub total_buses_needing_attention: usize,
    pub estimated_cost_if_all_planned: Decimal,
    pub estimated_cost_if_breakdowns: Decimal,
    pub potential_savings: Decimal,
    pub prevented_breakdowns_this_year: i64,
    pub total_saved_this_year: Decimal,
    pub prevention_rate: Decimal,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceAlert {
    pub bus_number: String,
    pub days_until_due: i32,
    pub current_mileage: i32,
    pub last_maintenance_date: DateTime<Utc>,
    pub estimated_cost: Decimal,
    pub breakdown_risk: String,
    pub cost_if_breakdown: Decimal,
    pub savings: Decimal,
    pub recommendation: String,
}

// Problema 5: rutas ineficientes
#[derive(Debug, Serialize)]
pub struct RouteOptimizationAnalysis {
    pub period: String,
    pub problematic_routes: Vec<RouteIssue>,
    pub total_routes_with_issues: usize,
    pub total_potential_savings_this_period: Decimal,
    pub annualized_savings: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RouteIssue {
    pub route_number: String,
    pub route_name: String,
    pub average_delay_minutes: Decimal,
    pub profit_margin: Decimal,
    pub trip_count: usize,
    pub potential_savings_this_period: Decimal,
    pub annualized_savings: Decimal,
    pub recommendation: String,
    pub priority: String,
}

// Resumen de ROI
#[derive(Debug, Serialize)]
pub struct RoiSummary {
    pub period: String,
    pub fuel_waste: SavingsOpportunity,
    pub empty_buses: SavingsOpportunity,
    pub driver_habits: SavingsOpportunity,
    pub maintenance_surprises: SavingsOpportunity,
    pub inefficient_routes: SavingsOpportunity,
    pub total_potential_annual_savings: Decimal,
    pub system_cost_year_1: Decimal,
    pub roi_percentage: Decimal,
    pub payback_months: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SavingsOpportunity {
    pub problem: String,
    pub current_annual_cost: Decimal,
    pub potential_annual_savings: Decimal,
    pub action_required: String,
    pub priority: String,
}

/// Narrativa generada por el servicio de análisis externo
#[derive(Debug, Serialize)]
pub struct NarrativeResponse {
    pub period: String,
    pub narrative: String,
}
