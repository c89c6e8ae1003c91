//! Agregado DailyOperation
//!
//! Un viaje diario de un bus por una ruta. Referencia a Bus y Route solo
//! por id; es la unidad natural de agregación de todos los reportes.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::{FuelEfficiency, Money};
use super::{DomainError, DomainResult};

#[derive(Debug, Clone)]
pub struct DailyOperation {
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
    revenue: Money,
    fuel_cost: Money,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl DailyOperation {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        bus_id: Uuid,
        route_id: Uuid,
        operation_date: NaiveDate,
        departure_time: NaiveTime,
        arrival_time: NaiveTime,
        passenger_count: i32,
        fuel_consumed: Decimal,
        distance_traveled: Decimal,
        delay_minutes: i32,
        driver_name: &str,
        revenue: Money,
        fuel_cost: Money,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if operation_date > now.date_naive() {
            return Err(DomainError::new("Operation date cannot be in the future"));
        }
        if arrival_time <= departure_time {
            return Err(DomainError::new(
                "Arrival time must be after departure time",
            ));
        }
        if passenger_count < 0 {
            return Err(DomainError::new("Passenger count cannot be negative"));
        }
        if fuel_consumed < Decimal::ZERO {
            return Err(DomainError::new("Fuel consumed cannot be negative"));
        }
        if distance_traveled <= Decimal::ZERO {
            return Err(DomainError::new(
                "Distance traveled must be greater than zero",
            ));
        }
        if delay_minutes < 0 {
            return Err(DomainError::new("Delay minutes cannot be negative"));
        }
        if driver_name.trim().is_empty() {
            return Err(DomainError::new("Driver name cannot be empty"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            bus_id,
            route_id,
            operation_date,
            departure_time,
            arrival_time,
            passenger_count,
            fuel_consumed,
            distance_traveled,
            delay_minutes,
            driver_name: driver_name.to_string(),
            revenue,
            fuel_cost,
            notes,
            created_at: now,
        })
    }

    /// Rehidratación desde el almacén.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
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
        revenue: Money,
        fuel_cost: Money,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            bus_id,
            route_id,
            operation_date,
            departure_time,
            arrival_time,
            passenger_count,
            fuel_consumed,
            distance_traveled,
            delay_minutes,
            driver_name,
            revenue,
            fuel_cost,
            notes,
            created_at,
        }
    }

    pub fn fuel_efficiency(&self) -> DomainResult<FuelEfficiency> {
        FuelEfficiency::create(self.distance_traveled, self.fuel_consumed)
    }

    pub fn cost_per_passenger(&self) -> Money {
        if self.passenger_count == 0 {
            return Money::zero();
        }
        Money::create(
            self.fuel_cost.amount() / Decimal::from(self.passenger_count),
            self.fuel_cost.currency(),
        )
        .unwrap_or_else(|_| Money::zero())
    }

    pub fn is_delayed(&self) -> bool {
        self.delay_minutes > 0
    }

    pub fn is_significantly_delayed(&self) -> bool {
        self.delay_minutes > 15
    }

    /// Menos del 30% de la capacidad del bus.
    pub fn is_low_occupancy(&self, bus_capacity: i32) -> bool {
        Decimal::from(self.passenger_count)
            < Decimal::from(bus_capacity) * Decimal::new(3, 1)
    }

    /// Más del 80% de la capacidad del bus.
    pub fn is_high_occupancy(&self, bus_capacity: i32) -> bool {
        Decimal::from(self.passenger_count)
            > Decimal::from(bus_capacity) * Decimal::new(8, 1)
    }

    pub fn actual_duration(&self) -> chrono::Duration {
        self.arrival_time - self.departure_time
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn bus_id(&self) -> Uuid {
        self.bus_id
    }
    pub fn route_id(&self) -> Uuid {
        self.route_id
    }
    pub fn operation_date(&self) -> NaiveDate {
        self.operation_date
    }
    pub fn departure_time(&self) -> NaiveTime {
        self.departure_time
    }
    pub fn arrival_time(&self) -> NaiveTime {
        self.arrival_time
    }
    pub fn passenger_count(&self) -> i32 {
        self.passenger_count
    }
    pub fn fuel_consumed(&self) -> Decimal {
        self.fuel_consumed
    }
    pub fn distance_traveled(&self) -> Decimal {
        self.distance_traveled
    }
    pub fn delay_minutes(&self) -> i32 {
        self.delay_minutes
    }
    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }
    pub fn revenue(&self) -> &Money {
        &self.revenue
    }
    pub fn fuel_cost(&self) -> &Money {
        &self.fuel_cost
    }
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn new_operation(now: DateTime<Utc>) -> DomainResult<DailyOperation> {
        DailyOperation::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            now.date_naive(),
            time(8, 0),
            time(9, 15),
            32,
            dec("9.5"),
            dec("58"),
            5,
            "J. Ramos",
            Money::usd(dec("96")).unwrap(),
            Money::usd(dec("29.64")).unwrap(),
            None,
            now,
        )
    }

    #[test]
    fn create_validates_times_and_amounts() {
        let now = Utc::now();
        let op = new_operation(now).unwrap();
        assert_eq!(op.passenger_count(), 32);
        assert!(op.is_delayed());
        assert!(!op.is_significantly_delayed());

        let bad = DailyOperation::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            now.date_naive(),
            time(9, 0),
            time(9, 0),
            10,
            dec("1"),
            dec("10"),
            0,
            "J. Ramos",
            Money::usd(dec("10")).unwrap(),
            Money::usd(dec("3")).unwrap(),
            None,
            now,
        );
        assert!(bad.unwrap_err().to_string().contains("Arrival time"));

        let future = DailyOperation::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            now.date_naive() + chrono::Duration::days(1),
            time(8, 0),
            time(9, 0),
            10,
            dec("1"),
            dec("10"),
            0,
            "J. Ramos",
            Money::usd(dec("10")).unwrap(),
            Money::usd(dec("3")).unwrap(),
            None,
            now,
        );
        assert!(future.unwrap_err().to_string().contains("future"));
    }

    #[test]
    fn occupancy_thresholds_use_capacity() {
        let now = Utc::now();
        let op = new_operation(now).unwrap();
        // 32 pasajeros: 64% de 50 plazas
        assert!(!op.is_low_occupancy(50));
        assert!(!op.is_high_occupancy(50));
        // 32 de 110 plazas queda por debajo del 30%
        assert!(op.is_low_occupancy(110));
        assert!(op.is_high_occupancy(35));
    }

    #[test]
    fn cost_per_passenger_guards_zero() {
        let now = Utc::now();
        let op = DailyOperation::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            now.date_naive(),
            time(22, 0),
            time(23, 0),
            0,
            dec("4"),
            dec("20"),
            0,
            "J. Ramos",
            Money::usd(dec("0")).unwrap(),
            Money::usd(dec("12.48")).unwrap(),
            None,
            now,
        )
        .unwrap();
        assert_eq!(op.cost_per_passenger().amount(), Decimal::ZERO);
    }

    #[test]
    fn fuel_efficiency_from_trip() {
        let now = Utc::now();
        let op = new_operation(now).unwrap();
        let eff = op.fuel_efficiency().unwrap();
        assert_eq!(eff.miles_per_gallon(), dec("58") / dec("9.5"));
    }
}
