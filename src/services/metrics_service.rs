//! Exposición Prometheus de la flota
//!
//! Cada scrape construye un registry nuevo a partir del snapshot actual:
//! visión de flota, carga del día, agregados de 30 días y familias por
//! bus, conductor y ruta. Solo gauges; el estado vive en la base de datos.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc, Weekday};
use prometheus::{Gauge, GaugeVec, Opts, Registry, TextEncoder};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::bus::{Bus, BusStatus};
use crate::models::operation::DailyOperation;
use crate::models::route::Route;

/// Ventana de servicio en millas, como el intervalo de mantenimiento
/// programado de un servidor.
const SERVICE_INTERVAL_MILES: i32 = 30_000;
const FUEL_TANK_GALLONS: f64 = 100.0;

fn dec_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Salud 0-100: 100 recién revisado, 0 al agotar el intervalo de servicio.
fn health_percent(bus: &Bus) -> f64 {
    let miles_in_cycle = bus.current_mileage().rem_euclid(SERVICE_INTERVAL_MILES);
    (100.0 - miles_in_cycle as f64 * 100.0 / SERVICE_INTERVAL_MILES as f64).max(0.0)
}

fn miles_to_service(bus: &Bus) -> f64 {
    (SERVICE_INTERVAL_MILES - bus.current_mileage().rem_euclid(SERVICE_INTERVAL_MILES)) as f64
}

/// Nivel de depósito estimado a partir del consumo de hoy.
fn fuel_level_percent(today_fuel: f64) -> f64 {
    let remaining = FUEL_TANK_GALLONS - (today_fuel % FUEL_TANK_GALLONS);
    remaining / FUEL_TANK_GALLONS * 100.0
}

fn status_code(status: BusStatus) -> f64 {
    match status {
        BusStatus::Active => 1.0,
        BusStatus::Maintenance => 2.0,
        BusStatus::Retired => 3.0,
        BusStatus::OutOfService => 4.0,
    }
}

/// Fines de semana y festivos fijos de EE. UU.: se espera menos carga.
fn is_holiday(date: chrono::NaiveDate) -> bool {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => return true,
        _ => {}
    }
    matches!(
        (date.month(), date.day()),
        (1, 1) | (7, 4) | (12, 25)
    ) || (date.month() == 11
        && (22..=28).contains(&date.day())
        && date.weekday() == Weekday::Thu)
}

fn delay_rate(ops: &[&DailyOperation]) -> f64 {
    if ops.is_empty() {
        return 0.0;
    }
    ops.iter().filter(|o| o.is_delayed()).count() as f64 / ops.len() as f64 * 100.0
}

fn gauge(registry: &Registry, name: &str, help: &str, value: f64) -> prometheus::Result<()> {
    let g = Gauge::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(g.clone()))?;
    g.set(value);
    Ok(())
}

fn gauge_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> prometheus::Result<GaugeVec> {
    let vec = GaugeVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(vec.clone()))?;
    Ok(vec)
}

fn sanitize_label(value: &str) -> String {
    value.replace(' ', "_").replace('"', "")
}

/// Render del snapshot en formato de exposición de texto.
pub fn render(
    buses: &[Bus],
    routes: &[Route],
    operations: &[DailyOperation],
    now: DateTime<Utc>,
) -> prometheus::Result<String> {
    let registry = Registry::new();
    let today = now.date_naive();
    let today_ops: Vec<&DailyOperation> = operations
        .iter()
        .filter(|o| o.operation_date() == today)
        .collect();

    // Visión de flota
    let count_status =
        |status: BusStatus| buses.iter().filter(|b| b.status() == status).count() as f64;
    let running = count_status(BusStatus::Active);
    let warning = buses
        .iter()
        .filter(|b| b.status() == BusStatus::Active && health_percent(b) < 30.0)
        .count() as f64;
    let critical = buses
        .iter()
        .filter(|b| b.status() == BusStatus::Active && health_percent(b) < 10.0)
        .count() as f64;

    gauge(&registry, "fleet_buses_total", "Total buses in fleet", buses.len() as f64)?;
    gauge(&registry, "fleet_buses_active", "Buses online and operational", running)?;
    gauge(
        &registry,
        "fleet_buses_warning",
        "Active buses close to service window",
        warning,
    )?;
    gauge(
        &registry,
        "fleet_buses_critical",
        "Active buses past service window",
        critical,
    )?;
    gauge(
        &registry,
        "fleet_buses_maintenance",
        "Buses in scheduled maintenance",
        count_status(BusStatus::Maintenance),
    )?;
    gauge(
        &registry,
        "fleet_buses_out_of_service",
        "Buses offline",
        count_status(BusStatus::OutOfService),
    )?;
    gauge(
        &registry,
        "fleet_buses_retired",
        "Buses retired from the fleet",
        count_status(BusStatus::Retired),
    )?;

    let fleet_health = if buses.is_empty() {
        0.0
    } else {
        ((running - critical) / buses.len() as f64 * 100.0).max(0.0)
    };
    gauge(&registry, "fleet_health_score", "Fleet health score 0-100", fleet_health)?;
    gauge(
        &registry,
        "fleet_capacity_used_percent",
        "Share of the fleet in active service",
        if buses.is_empty() {
            0.0
        } else {
            running / buses.len() as f64 * 100.0
        },
    )?;

    // Carga de hoy
    gauge(
        &registry,
        "workload_trips_today",
        "Trips completed today",
        today_ops.len() as f64,
    )?;
    gauge(
        &registry,
        "workload_passengers_today",
        "Passengers carried today",
        today_ops.iter().map(|o| o.passenger_count() as f64).sum(),
    )?;
    gauge(
        &registry,
        "workload_revenue_today_usd",
        "Revenue generated today USD",
        dec_f64(today_ops.iter().map(|o| o.revenue().amount()).sum()),
    )?;
    let today_fuel = dec_f64(today_ops.iter().map(|o| o.fuel_consumed()).sum());
    gauge(
        &registry,
        "workload_fuel_today_gallons",
        "Fuel consumed today gal",
        today_fuel,
    )?;
    gauge(
        &registry,
        "workload_distance_today_miles",
        "Distance covered today miles",
        dec_f64(today_ops.iter().map(|o| o.distance_traveled()).sum()),
    )?;
    gauge(
        &registry,
        "workload_delayed_trips_today",
        "Delayed trips today",
        today_ops.iter().filter(|o| o.is_delayed()).count() as f64,
    )?;
    gauge(
        &registry,
        "workload_on_time_percent",
        "Trip on-time rate percent",
        if today_ops.is_empty() {
            100.0
        } else {
            today_ops.iter().filter(|o| !o.is_delayed()).count() as f64
                / today_ops.len() as f64
                * 100.0
        },
    )?;
    gauge(
        &registry,
        "workload_is_holiday",
        "Holiday mode (reduced load expected)",
        if is_holiday(today) { 1.0 } else { 0.0 },
    )?;

    // Agregados de la ventana (30 días)
    let total_fuel = dec_f64(operations.iter().map(|o| o.fuel_consumed()).sum());
    let total_distance = dec_f64(operations.iter().map(|o| o.distance_traveled()).sum());
    let total_revenue = dec_f64(operations.iter().map(|o| o.revenue().amount()).sum());
    let total_fuel_cost = dec_f64(operations.iter().map(|o| o.fuel_cost().amount()).sum());
    gauge(&registry, "monthly_trips", "Total trips last 30 days", operations.len() as f64)?;
    gauge(
        &registry,
        "monthly_passengers",
        "Total passengers 30d",
        operations.iter().map(|o| o.passenger_count() as f64).sum(),
    )?;
    gauge(&registry, "monthly_revenue_usd", "Total revenue 30d USD", total_revenue)?;
    gauge(&registry, "monthly_fuel_gallons", "Total fuel 30d gal", total_fuel)?;
    gauge(&registry, "monthly_fuel_cost_usd", "Fuel cost 30d USD", total_fuel_cost)?;
    gauge(
        &registry,
        "monthly_efficiency_mpg",
        "Fleet fuel efficiency MPG",
        if total_fuel > 0.0 {
            total_distance / total_fuel
        } else {
            0.0
        },
    )?;
    gauge(
        &registry,
        "monthly_profit_usd",
        "Net profit 30d USD",
        total_revenue - total_fuel_cost,
    )?;

    // Tendencia diaria (7 días) con etiquetas de fecha
    let daily_trips = gauge_vec(&registry, "daily_trips", "Daily trip count", &["date", "day"])?;
    let daily_passengers = gauge_vec(
        &registry,
        "daily_passengers",
        "Daily passenger throughput",
        &["date", "day"],
    )?;
    let daily_revenue = gauge_vec(
        &registry,
        "daily_revenue_usd",
        "Daily revenue USD",
        &["date", "day"],
    )?;
    let daily_fuel = gauge_vec(
        &registry,
        "daily_fuel_gallons",
        "Daily fuel consumption gal",
        &["date", "day"],
    )?;

    for offset in (0..7).rev() {
        let date = today - chrono::Duration::days(offset);
        let day_ops: Vec<&DailyOperation> = operations
            .iter()
            .filter(|o| o.operation_date() == date)
            .collect();
        let labels = [date.format("%Y-%m-%d").to_string(), date.format("%a").to_string()];
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();

        daily_trips.with_label_values(&labels).set(day_ops.len() as f64);
        daily_passengers
            .with_label_values(&labels)
            .set(day_ops.iter().map(|o| o.passenger_count() as f64).sum());
        daily_revenue
            .with_label_values(&labels)
            .set(dec_f64(day_ops.iter().map(|o| o.revenue().amount()).sum()));
        daily_fuel
            .with_label_values(&labels)
            .set(dec_f64(day_ops.iter().map(|o| o.fuel_consumed()).sum()));
    }

    // Familias por bus
    let bus_health = gauge_vec(
        &registry,
        "bus_health_percent",
        "Health bar 0-100 (100=just serviced, 0=needs service)",
        &["bus"],
    )?;
    let bus_fuel_level = gauge_vec(&registry, "bus_fuel_level_percent", "Fuel level percent", &["bus"])?;
    let bus_mileage = gauge_vec(&registry, "bus_mileage_miles", "Current odometer miles", &["bus"])?;
    let bus_to_service = gauge_vec(
        &registry,
        "bus_miles_to_service",
        "Miles until next scheduled service",
        &["bus"],
    )?;
    let bus_status = gauge_vec(
        &registry,
        "bus_status_code",
        "Status 1=Active 2=Maintenance 3=Retired 4=OutOfService",
        &["bus", "status"],
    )?;
    let bus_trips = gauge_vec(&registry, "bus_trips_30d", "Trips completed last 30 days", &["bus"])?;
    let bus_passengers = gauge_vec(
        &registry,
        "bus_passengers_30d",
        "Passengers carried last 30 days",
        &["bus"],
    )?;
    let bus_efficiency = gauge_vec(&registry, "bus_efficiency_mpg", "Fuel efficiency MPG", &["bus"])?;
    let bus_delay_rate = gauge_vec(&registry, "bus_delay_rate_percent", "Delay rate percent", &["bus"])?;
    let bus_revenue = gauge_vec(&registry, "bus_revenue_30d_usd", "Revenue generated 30d USD", &["bus"])?;

    let mut ops_by_bus: HashMap<Uuid, Vec<&DailyOperation>> = HashMap::new();
    for op in operations {
        ops_by_bus.entry(op.bus_id()).or_default().push(op);
    }

    for bus in buses {
        let id = bus.bus_number().value();
        let empty = Vec::new();
        let ops = ops_by_bus.get(&bus.id()).unwrap_or(&empty);
        let fuel = dec_f64(ops.iter().map(|o| o.fuel_consumed()).sum());
        let distance = dec_f64(ops.iter().map(|o| o.distance_traveled()).sum());
        let today_bus_fuel = dec_f64(
            ops.iter()
                .filter(|o| o.operation_date() == today)
                .map(|o| o.fuel_consumed())
                .sum(),
        );

        bus_health.with_label_values(&[id]).set(health_percent(bus));
        bus_fuel_level
            .with_label_values(&[id])
            .set(fuel_level_percent(today_bus_fuel));
        bus_mileage
            .with_label_values(&[id])
            .set(bus.current_mileage() as f64);
        bus_to_service
            .with_label_values(&[id])
            .set(miles_to_service(bus));
        bus_status
            .with_label_values(&[id, bus.status().as_str()])
            .set(status_code(bus.status()));
        bus_trips.with_label_values(&[id]).set(ops.len() as f64);
        bus_passengers
            .with_label_values(&[id])
            .set(ops.iter().map(|o| o.passenger_count() as f64).sum());
        bus_efficiency
            .with_label_values(&[id])
            .set(if fuel > 0.0 { distance / fuel } else { 0.0 });
        bus_delay_rate.with_label_values(&[id]).set(delay_rate(ops));
        bus_revenue
            .with_label_values(&[id])
            .set(dec_f64(ops.iter().map(|o| o.revenue().amount()).sum()));
    }

    // Familias por conductor (los 15 con más viajes)
    let driver_trips = gauge_vec(&registry, "driver_trips_30d", "Trips completed by driver 30d", &["driver"])?;
    let driver_passengers = gauge_vec(
        &registry,
        "driver_passengers_30d",
        "Passengers handled by driver 30d",
        &["driver"],
    )?;
    let driver_efficiency = gauge_vec(
        &registry,
        "driver_efficiency_mpg",
        "Driver fuel efficiency MPG",
        &["driver"],
    )?;
    let driver_delay_rate = gauge_vec(
        &registry,
        "driver_delay_rate_percent",
        "Driver delay rate percent",
        &["driver"],
    )?;
    let driver_revenue = gauge_vec(
        &registry,
        "driver_revenue_30d_usd",
        "Revenue generated by driver 30d USD",
        &["driver"],
    )?;

    let mut ops_by_driver: HashMap<&str, Vec<&DailyOperation>> = HashMap::new();
    for op in operations {
        ops_by_driver.entry(op.driver_name()).or_default().push(op);
    }
    let mut drivers: Vec<(&str, Vec<&DailyOperation>)> = ops_by_driver.into_iter().collect();
    drivers.sort_by_key(|(_, ops)| std::cmp::Reverse(ops.len()));
    drivers.truncate(15);

    for (name, ops) in &drivers {
        let label = sanitize_label(name);
        let fuel = dec_f64(ops.iter().map(|o| o.fuel_consumed()).sum());
        let distance = dec_f64(ops.iter().map(|o| o.distance_traveled()).sum());

        driver_trips.with_label_values(&[&label]).set(ops.len() as f64);
        driver_passengers
            .with_label_values(&[&label])
            .set(ops.iter().map(|o| o.passenger_count() as f64).sum());
        driver_efficiency
            .with_label_values(&[&label])
            .set(if fuel > 0.0 { distance / fuel } else { 0.0 });
        driver_delay_rate
            .with_label_values(&[&label])
            .set(delay_rate(ops));
        driver_revenue
            .with_label_values(&[&label])
            .set(dec_f64(ops.iter().map(|o| o.revenue().amount()).sum()));
    }

    // Familias por ruta
    let route_trips = gauge_vec(&registry, "route_trips_30d", "Trips on route 30d", &["route"])?;
    let route_passengers = gauge_vec(
        &registry,
        "route_passengers_30d",
        "Passengers on route 30d",
        &["route"],
    )?;
    let route_revenue = gauge_vec(
        &registry,
        "route_revenue_30d_usd",
        "Revenue from route 30d USD",
        &["route"],
    )?;
    let route_delay_rate = gauge_vec(
        &registry,
        "route_delay_rate_percent",
        "Route delay rate percent",
        &["route"],
    )?;
    let route_avg_load = gauge_vec(
        &registry,
        "route_avg_load",
        "Average passengers per trip",
        &["route"],
    )?;

    let mut ops_by_route: HashMap<Uuid, Vec<&DailyOperation>> = HashMap::new();
    for op in operations {
        ops_by_route.entry(op.route_id()).or_default().push(op);
    }

    for route in routes {
        let number = route.route_number();
        let empty = Vec::new();
        let ops = ops_by_route.get(&route.id()).unwrap_or(&empty);

        route_trips.with_label_values(&[number]).set(ops.len() as f64);
        route_passengers
            .with_label_values(&[number])
            .set(ops.iter().map(|o| o.passenger_count() as f64).sum());
        route_revenue
            .with_label_values(&[number])
            .set(dec_f64(ops.iter().map(|o| o.revenue().amount()).sum()));
        route_delay_rate
            .with_label_values(&[number])
            .set(delay_rate(ops));
        route_avg_load.with_label_values(&[number]).set(if ops.is_empty() {
            0.0
        } else {
            ops.iter().map(|o| o.passenger_count() as f64).sum::<f64>() / ops.len() as f64
        });
    }

    TextEncoder::new().encode_to_string(&registry.gather())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::value_objects::{BusNumber, Money};
    use chrono::{Duration, NaiveTime};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn render_produces_prometheus_text_format() {
        let now = Utc::now();
        let (bus, _) = Bus::create(
            BusNumber::create("BUS-001").unwrap(),
            "BYD K9 Electric",
            2023,
            45,
            dec("95"),
            now - Duration::days(5),
            Money::usd(dec("500000")).unwrap(),
            now,
        )
        .unwrap();
        let route = Route::create(
            "R-7",
            "Harbor Loop",
            dec("9"),
            35,
            7,
            "Harbor",
            "Downtown",
            Money::usd(dec("28")).unwrap(),
            now,
        )
        .unwrap();
        let op = DailyOperation::create(
            bus.id(),
            route.id(),
            now.date_naive(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(8, 10, 0).unwrap(),
            28,
            dec("4.5"),
            dec("27"),
            3,
            "M. Oduya",
            Money::usd(dec("84")).unwrap(),
            Money::usd(dec("14.04")).unwrap(),
            None,
            now,
        )
        .unwrap();

        let text = render(&[bus], &[route], &[op], now).unwrap();

        assert!(text.contains("# HELP fleet_buses_total Total buses in fleet"));
        assert!(text.contains("# TYPE fleet_buses_total gauge"));
        assert!(text.contains("fleet_buses_total 1"));
        assert!(text.contains("fleet_buses_active 1"));
        assert!(text.contains("workload_trips_today 1"));
        assert!(text.contains("monthly_trips 1"));
        assert!(text.contains("bus_health_percent{bus=\"BUS-001\"} 100"));
        assert!(text.contains("route_trips_30d{route=\"R-7\"} 1"));
        assert!(text.contains("driver_trips_30d{driver=\"M._Oduya\"} 1"));
    }

    #[test]
    fn health_decreases_with_mileage_cycle() {
        let now = Utc::now();
        let (mut bus, _) = Bus::create(
            BusNumber::create("BUS-002").unwrap(),
            "Gillig Low Floor",
            2020,
            40,
            dec("90"),
            now - Duration::days(5),
            Money::usd(dec("350000")).unwrap(),
            now,
        )
        .unwrap();
        assert_eq!(health_percent(&bus), 100.0);

        bus.update_mileage(15_000, now).unwrap();
        assert!((health_percent(&bus) - 50.0).abs() < f64::EPSILON);
        assert_eq!(miles_to_service(&bus), 15_000.0);
    }

    #[test]
    fn holiday_detection() {
        assert!(is_holiday(chrono::NaiveDate::from_ymd_opt(2026, 7, 4).unwrap()));
        assert!(is_holiday(chrono::NaiveDate::from_ymd_opt(2026, 12, 25).unwrap()));
        // Un miércoles cualquiera
        assert!(!is_holiday(chrono::NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()));
    }
}
