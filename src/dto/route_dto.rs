//! DTOs de Route

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::route::Route;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRouteRequest {
    #[validate(length(min = 2, max = 20))]
    pub route_number: String,

    #[validate(length(min = 2, max = 100))]
    pub route_name: String,

    pub distance: Decimal,

    pub estimated_duration: i32,

    pub number_of_stops: i32,

    #[validate(length(min = 2, max = 200))]
    pub start_location: String,

    #[validate(length(min = 2, max = 200))]
    pub end_location: String,

    pub estimated_fuel_cost: Decimal,

    pub currency: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFuelCostRequest {
    pub estimated_fuel_cost: Decimal,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub id: String,
    pub route_number: String,
    pub route_name: String,
    pub distance: Decimal,
    pub estimated_duration: i32,
    pub number_of_stops: i32,
    pub start_location: String,
    pub end_location: String,
    pub is_active: bool,
    pub estimated_fuel_cost: Decimal,
    pub fuel_cost_currency: String,
    pub average_distance_per_stop: Decimal,
}

impl From<&Route> for RouteResponse {
    fn from(route: &Route) -> Self {
        Self {
            id: route.id().to_string(),
            route_number: route.route_number().to_string(),
            route_name: route.route_name().to_string(),
            distance: route.distance(),
            estimated_duration: route.estimated_duration(),
            number_of_stops: route.number_of_stops(),
            start_location: route.start_location().to_string(),
            end_location: route.end_location().to_string(),
            is_active: route.is_active(),
            estimated_fuel_cost: route.estimated_fuel_cost().amount(),
            fuel_cost_currency: route.estimated_fuel_cost().currency().to_string(),
            average_distance_per_stop: route.average_distance_per_stop(),
        }
    }
}
