//! Agregado Route

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::Money;
use super::{DomainError, DomainResult};

#[derive(Debug, Clone)]
pub struct Route {
    id: Uuid,
    route_number: String,
    route_name: String,
    distance: Decimal,
    estimated_duration: i32,
    number_of_stops: i32,
    start_location: String,
    end_location: String,
    is_active: bool,
    estimated_fuel_cost: Money,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Route {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        route_number: &str,
        route_name: &str,
        distance: Decimal,
        estimated_duration: i32,
        number_of_stops: i32,
        start_location: &str,
        end_location: &str,
        estimated_fuel_cost: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if route_number.trim().is_empty() {
            return Err(DomainError::new("Route number cannot be empty"));
        }
        if route_name.trim().is_empty() {
            return Err(DomainError::new("Route name cannot be empty"));
        }
        if distance <= Decimal::ZERO || distance > Decimal::from(500) {
            return Err(DomainError::new("Distance must be between 0 and 500 miles"));
        }
        // 12 horas como máximo
        if estimated_duration <= 0 || estimated_duration > 720 {
            return Err(DomainError::new(
                "Estimated duration must be between 0 and 720 minutes",
            ));
        }
        if !(2..=100).contains(&number_of_stops) {
            return Err(DomainError::new(
                "Number of stops must be between 2 and 100",
            ));
        }
        if start_location.trim().is_empty() {
            return Err(DomainError::new("Start location cannot be empty"));
        }
        if end_location.trim().is_empty() {
            return Err(DomainError::new("End location cannot be empty"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            route_number: route_number.to_string(),
            route_name: route_name.to_string(),
            distance,
            estimated_duration,
            number_of_stops,
            start_location: start_location.to_string(),
            end_location: end_location.to_string(),
            is_active: true,
            estimated_fuel_cost,
            created_at: now,
            updated_at: None,
        })
    }

    /// Rehidratación desde el almacén.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        route_number: String,
        route_name: String,
        distance: Decimal,
        estimated_duration: i32,
        number_of_stops: i32,
        start_location: String,
        end_location: String,
        is_active: bool,
        estimated_fuel_cost: Money,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            route_number,
            route_name,
            distance,
            estimated_duration,
            number_of_stops,
            start_location,
            end_location,
            is_active,
            estimated_fuel_cost,
            created_at,
            updated_at,
        }
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_active {
            return Err(DomainError::new("Route is already inactive"));
        }
        self.is_active = false;
        self.updated_at = Some(now);
        Ok(())
    }

    pub fn activate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_active {
            return Err(DomainError::new("Route is already active"));
        }
        self.is_active = true;
        self.updated_at = Some(now);
        Ok(())
    }

    pub fn update_estimated_fuel_cost(&mut self, new_cost: Money, now: DateTime<Utc>) {
        self.estimated_fuel_cost = new_cost;
        self.updated_at = Some(now);
    }

    pub fn average_distance_per_stop(&self) -> Decimal {
        if self.number_of_stops > 0 {
            self.distance / Decimal::from(self.number_of_stops)
        } else {
            Decimal::ZERO
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn route_number(&self) -> &str {
        &self.route_number
    }
    pub fn route_name(&self) -> &str {
        &self.route_name
    }
    pub fn distance(&self) -> Decimal {
        self.distance
    }
    pub fn estimated_duration(&self) -> i32 {
        self.estimated_duration
    }
    pub fn number_of_stops(&self) -> i32 {
        self.number_of_stops
    }
    pub fn start_location(&self) -> &str {
        &self.start_location
    }
    pub fn end_location(&self) -> &str {
        &self.end_location
    }
    pub fn is_active(&self) -> bool {
        self.is_active
    }
    pub fn estimated_fuel_cost(&self) -> &Money {
        &self.estimated_fuel_cost
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn new_route(now: DateTime<Utc>) -> Route {
        Route::create(
            "R-12",
            "Downtown Express",
            dec("14.5"),
            55,
            18,
            "Central Station",
            "Airport Terminal",
            Money::usd(dec("45")).unwrap(),
            now,
        )
        .unwrap()
    }

    #[test]
    fn create_validates_ranges() {
        let now = Utc::now();
        let cost = || Money::usd(dec("45")).unwrap();

        assert!(Route::create("", "n", dec("10"), 60, 5, "a", "b", cost(), now).is_err());
        assert!(Route::create("R-1", " ", dec("10"), 60, 5, "a", "b", cost(), now).is_err());
        assert!(Route::create("R-1", "n", dec("501"), 60, 5, "a", "b", cost(), now).is_err());
        assert!(Route::create("R-1", "n", dec("10"), 0, 5, "a", "b", cost(), now).is_err());
        assert!(Route::create("R-1", "n", dec("10"), 721, 5, "a", "b", cost(), now).is_err());
        assert!(Route::create("R-1", "n", dec("10"), 60, 1, "a", "b", cost(), now).is_err());
        assert!(Route::create("R-1", "n", dec("10"), 60, 101, "a", "b", cost(), now).is_err());
        assert!(Route::create("R-1", "n", dec("10"), 60, 5, " ", "b", cost(), now).is_err());
        assert!(Route::create("R-1", "n", dec("10"), 60, 5, "a", " ", cost(), now).is_err());
    }

    #[test]
    fn activation_toggles_fail_when_already_in_state() {
        let now = Utc::now();
        let mut route = new_route(now);
        assert!(route.is_active());

        assert!(route.activate(now).is_err());
        route.deactivate(now).unwrap();
        assert!(!route.is_active());
        assert!(route.deactivate(now).is_err());
        route.activate(now).unwrap();
        assert!(route.is_active());
    }

    #[test]
    fn average_distance_per_stop() {
        let now = Utc::now();
        let route = new_route(now);
        assert_eq!(
            route.average_distance_per_stop(),
            dec("14.5") / Decimal::from(18)
        );
    }
}
