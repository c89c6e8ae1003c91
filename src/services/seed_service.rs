//! Generador de datos de prueba
//!
//! Flota realista basada en los datos del US DOT: 20 buses de ciudad
//! pequeña, 10 rutas y 90 días de operaciones a ~6 MPG y $3.12/galón.
//! Todo pasa por las factorías públicas del dominio y por la carga masiva
//! explícita de historial; no hay puertas traseras al estado privado.

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::models::bus::{Bus, MaintenanceRecord};
use crate::models::operation::DailyOperation;
use crate::models::route::Route;
use crate::models::value_objects::{BusNumber, Money};
use crate::models::{DomainError, DomainResult};

pub const SEED_BUS_COUNT: usize = 20;
pub const SEED_ROUTE_COUNT: usize = 10;
pub const SEED_OPERATION_DAYS: i64 = 90;

const BUS_MODELS: &[&str] = &[
    "Volvo 7900 Electric",
    "New Flyer Xcelsior",
    "Gillig Low Floor",
    "Nova Bus LFS",
    "BYD K9 Electric",
];

const DRIVERS: &[&str] = &[
    "J. Ramos",
    "M. Oduya",
    "K. Novak",
    "A. Diallo",
    "S. Petrov",
    "L. Carter",
    "R. Vega",
    "T. Lindqvist",
    "D. Okafor",
    "P. Marchetti",
];

const LOCATIONS: &[&str] = &[
    "Central Station",
    "Harbor Terminal",
    "University Campus",
    "Airport",
    "Riverside Park",
    "Tech District",
    "Old Town",
    "Stadium",
    "North Mall",
    "East Depot",
];

#[derive(Debug)]
pub struct SeedData {
    pub buses: Vec<Bus>,
    pub routes: Vec<Route>,
    pub operations: Vec<DailyOperation>,
    pub maintenance_record_count: usize,
}

fn money(rng_value: f64) -> DomainResult<Money> {
    let amount = Decimal::from_f64(rng_value)
        .ok_or_else(|| DomainError::new("Invalid monetary value"))?
        .round_dp(2);
    Money::usd(amount)
}

fn seed_buses<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> DomainResult<Vec<Bus>> {
    use chrono::Datelike;

    let mut buses = Vec::with_capacity(SEED_BUS_COUNT);
    for i in 1..=SEED_BUS_COUNT {
        let purchase_date = now - Duration::days(rng.gen_range(90..2900));
        let number = BusNumber::create(&format!("BUS-{:03}", i))?;
        let model = BUS_MODELS.choose(rng).copied().unwrap_or(BUS_MODELS[0]);
        let capacity = *[40, 45, 50, 55, 60].choose(rng).unwrap_or(&50);
        let price = money(rng.gen_range(350_000.0..550_000.0))?;

        let (mut bus, _event) = Bus::create(
            number,
            model,
            purchase_date.year().max(2000),
            capacity,
            Decimal::from(rng.gen_range(80..120)),
            purchase_date,
            price,
            now,
        )?;

        // Kilometraje acumulado según la edad del vehículo
        let age_days = (now - purchase_date).num_days();
        let mileage = (age_days * rng.gen_range(60..140)) as i32;
        bus.update_mileage(mileage, now)?;

        // Historial de mantenimiento previo, vía la carga masiva explícita
        let history_count = rng.gen_range(1..=4);
        let mut history = Vec::with_capacity(history_count);
        for j in 0..history_count {
            let record_date = now - Duration::days(rng.gen_range(30..age_days.max(31)));
            history.push(MaintenanceRecord::create(
                bus.id(),
                record_date,
                if j % 2 == 0 { "Routine" } else { "Repair" },
                "Scheduled maintenance completed",
                money(rng.gen_range(400.0..2500.0))?,
                (mileage as f64 * rng.gen_range(0.2..0.9)) as i32,
                "City Garage",
                None,
                rng.gen_range(2..24),
                now,
            )?);
        }
        bus.import_maintenance_history(history)?;

        buses.push(bus);
    }
    Ok(buses)
}

fn seed_routes<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> DomainResult<Vec<Route>> {
    let mut routes = Vec::with_capacity(SEED_ROUTE_COUNT);
    for i in 1..=SEED_ROUTE_COUNT {
        let distance = rng.gen_range(5.0..25.0);
        let start = LOCATIONS[(i - 1) % LOCATIONS.len()];
        let end = LOCATIONS[i % LOCATIONS.len()];
        routes.push(Route::create(
            &format!("R-{:02}", i),
            &format!("{} - {}", start, end),
            Decimal::from_f64(distance)
                .ok_or_else(|| DomainError::new("Invalid distance"))?
                .round_dp(1),
            rng.gen_range(30..90),
            rng.gen_range(8..25),
            start,
            end,
            money(distance * 3.12 / 6.0)?,
            now,
        )?);
    }
    Ok(routes)
}

fn seed_operations<R: Rng>(
    rng: &mut R,
    buses: &[Bus],
    routes: &[Route],
    now: DateTime<Utc>,
) -> DomainResult<Vec<DailyOperation>> {
    let mut operations = Vec::new();

    for day_offset in 1..=SEED_OPERATION_DAYS {
        let date = now.date_naive() - Duration::days(day_offset);
        for bus in buses {
            let trips = rng.gen_range(2..=4);
            for _ in 0..trips {
                let route = match routes.choose(rng) {
                    Some(r) => r,
                    None => continue,
                };
                let departure_hour = rng.gen_range(6..22);
                let departure = chrono::NaiveTime::from_hms_opt(departure_hour, 0, 0)
                    .unwrap_or_else(|| now.time().with_nanosecond(0).unwrap_or(now.time()));
                let duration_minutes = route.estimated_duration() + rng.gen_range(0..20);
                let arrival = departure + Duration::minutes(duration_minutes as i64);

                let distance = route.distance();
                // Eficiencia entre 4.5 y 8 MPG alrededor de la media del sector
                let mpg = rng.gen_range(4.5..8.0);
                let fuel = (distance
                    / Decimal::from_f64(mpg)
                        .ok_or_else(|| DomainError::new("Invalid efficiency"))?)
                .round_dp(2);

                let passengers = rng.gen_range(3..=bus.capacity());
                let delay = if rng.gen_bool(0.7) {
                    0
                } else {
                    rng.gen_range(1..30)
                };

                operations.push(DailyOperation::create(
                    bus.id(),
                    route.id(),
                    date,
                    departure,
                    arrival,
                    passengers,
                    fuel,
                    distance,
                    delay,
                    DRIVERS.choose(rng).copied().unwrap_or(DRIVERS[0]),
                    money(passengers as f64 * 2.75)?,
                    Money::usd((fuel * Decimal::new(312, 2)).round_dp(2))?,
                    None,
                    now,
                )?);
            }
        }
    }
    Ok(operations)
}

/// Genera la flota completa de prueba. Determinista para un mismo RNG.
pub fn generate<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> DomainResult<SeedData> {
    let buses = seed_buses(rng, now)?;
    let routes = seed_routes(rng, now)?;
    let operations = seed_operations(rng, &buses, &routes, now)?;
    let maintenance_record_count = buses.iter().map(|b| b.maintenance_records().len()).sum();

    Ok(SeedData {
        buses,
        routes,
        operations,
        maintenance_record_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generates_a_consistent_fleet() {
        let mut rng = StdRng::seed_from_u64(42);
        let now = Utc::now();
        let data = generate(&mut rng, now).unwrap();

        assert_eq!(data.buses.len(), SEED_BUS_COUNT);
        assert_eq!(data.routes.len(), SEED_ROUTE_COUNT);
        assert!(data.maintenance_record_count >= SEED_BUS_COUNT);
        // 2-4 viajes por bus y día
        let min_ops = SEED_BUS_COUNT as i64 * SEED_OPERATION_DAYS * 2;
        let max_ops = SEED_BUS_COUNT as i64 * SEED_OPERATION_DAYS * 4;
        assert!(data.operations.len() as i64 >= min_ops);
        assert!(data.operations.len() as i64 <= max_ops);
    }

    #[test]
    fn generated_operations_reference_generated_fleet() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();
        let data = generate(&mut rng, now).unwrap();

        for op in data.operations.iter().take(200) {
            assert!(data.buses.iter().any(|b| b.id() == op.bus_id()));
            assert!(data.routes.iter().any(|r| r.id() == op.route_id()));
            assert!(op.distance_traveled() > Decimal::ZERO);
            assert!(op.fuel_consumed() > Decimal::ZERO);
        }
    }

    #[test]
    fn bus_numbers_are_unique_and_well_formed() {
        let mut rng = StdRng::seed_from_u64(99);
        let now = Utc::now();
        let data = generate(&mut rng, now).unwrap();

        let mut numbers: Vec<&str> = data
            .buses
            .iter()
            .map(|b| b.bus_number().value())
            .collect();
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), SEED_BUS_COUNT);
        assert!(numbers.iter().all(|n| n.starts_with("BUS-")));
    }
}
