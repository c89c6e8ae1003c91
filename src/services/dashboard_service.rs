//! Agregaciones del dashboard
//!
//! KPIs, estado de flota en vivo, tendencias por día y desglose de costes.
//! Igual que los reportes de negocio: funciones puras sobre un snapshot.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dto::dashboard_dto::*;
use crate::models::bus::{Bus, BusStatus};
use crate::models::operation::DailyOperation;

fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

pub fn kpis(buses: &[Bus], operations: &[DailyOperation], now: DateTime<Utc>) -> DashboardKpis {
    let total_operations = operations.len();
    let total_passengers: i64 = operations.iter().map(|o| o.passenger_count() as i64).sum();
    let total_revenue: Decimal = operations.iter().map(|o| o.revenue().amount()).sum();
    let total_fuel_cost: Decimal = operations.iter().map(|o| o.fuel_cost().amount()).sum();
    let total_distance: Decimal = operations.iter().map(|o| o.distance_traveled()).sum();
    let total_fuel: Decimal = operations.iter().map(|o| o.fuel_consumed()).sum();
    let delayed = operations.iter().filter(|o| o.is_delayed()).count();

    let on_time_percentage = if total_operations > 0 {
        Decimal::from((total_operations - delayed) as i64)
            / Decimal::from(total_operations as i64)
            * Decimal::from(100)
    } else {
        Decimal::from(100)
    };

    DashboardKpis {
        total_buses: buses.len(),
        active_buses: buses
            .iter()
            .filter(|b| b.status() == BusStatus::Active)
            .count(),
        total_operations_last_30_days: total_operations,
        total_passengers_last_30_days: total_passengers,
        total_revenue_last_30_days: total_revenue,
        total_fuel_cost_last_30_days: total_fuel_cost,
        net_profit_last_30_days: total_revenue - total_fuel_cost,
        average_fuel_efficiency_mpg: safe_div(total_distance, total_fuel),
        on_time_percentage,
        total_distance_miles: total_distance,
        buses_requiring_maintenance: buses
            .iter()
            .filter(|b| b.requires_maintenance(now))
            .count(),
    }
}

pub fn fleet_status(
    buses: &[Bus],
    today_operations: &[DailyOperation],
    now: DateTime<Utc>,
) -> FleetStatus {
    let count_status =
        |status: BusStatus| buses.iter().filter(|b| b.status() == status).count();

    let delayed: Vec<&DailyOperation> = today_operations
        .iter()
        .filter(|o| o.is_delayed())
        .collect();
    let delay_sum: Decimal = delayed
        .iter()
        .map(|o| Decimal::from(o.delay_minutes()))
        .sum();

    FleetStatus {
        timestamp: now,
        total_buses: buses.len(),
        active_buses: count_status(BusStatus::Active),
        in_maintenance: count_status(BusStatus::Maintenance),
        out_of_service: count_status(BusStatus::OutOfService),
        retired: count_status(BusStatus::Retired),
        operations_today: today_operations.len(),
        passengers_today: today_operations
            .iter()
            .map(|o| o.passenger_count() as i64)
            .sum(),
        delays_today: delayed.len(),
        average_delay_minutes: safe_div(delay_sum, Decimal::from(delayed.len())),
    }
}

fn group_by_date(operations: &[DailyOperation]) -> Vec<(NaiveDate, Vec<&DailyOperation>)> {
    let mut by_date: HashMap<NaiveDate, Vec<&DailyOperation>> = HashMap::new();
    for op in operations {
        by_date.entry(op.operation_date()).or_default().push(op);
    }
    let mut days: Vec<(NaiveDate, Vec<&DailyOperation>)> = by_date.into_iter().collect();
    days.sort_by_key(|(date, _)| *date);
    days
}

pub fn fuel_efficiency_trends(operations: &[DailyOperation]) -> Vec<FuelEfficiencyTrend> {
    group_by_date(operations)
        .into_iter()
        .map(|(date, ops)| {
            let distance: Decimal = ops.iter().map(|o| o.distance_traveled()).sum();
            let fuel: Decimal = ops.iter().map(|o| o.fuel_consumed()).sum();
            FuelEfficiencyTrend {
                date,
                average_mpg: safe_div(distance, fuel),
                total_distance: distance,
                total_fuel_consumed: fuel,
                operation_count: ops.len(),
            }
        })
        .collect()
}

pub fn ridership_trends(operations: &[DailyOperation]) -> Vec<RidershipTrend> {
    group_by_date(operations)
        .into_iter()
        .map(|(date, ops)| {
            let passengers: i64 = ops.iter().map(|o| o.passenger_count() as i64).sum();
            RidershipTrend {
                date,
                total_passengers: passengers,
                total_operations: ops.len(),
                average_passengers_per_trip: safe_div(
                    Decimal::from(passengers),
                    Decimal::from(ops.len()),
                ),
                revenue: ops.iter().map(|o| o.revenue().amount()).sum(),
            }
        })
        .collect()
}

pub fn cost_analysis(
    buses: &[Bus],
    operations: &[DailyOperation],
    window_start: DateTime<Utc>,
    days: i64,
) -> CostAnalysis {
    let total_fuel_cost: Decimal = operations.iter().map(|o| o.fuel_cost().amount()).sum();
    let total_revenue: Decimal = operations.iter().map(|o| o.revenue().amount()).sum();
    let total_maintenance_cost: Decimal = buses
        .iter()
        .flat_map(|b| b.maintenance_records())
        .filter(|r| r.maintenance_date() >= window_start)
        .map(|r| r.cost().amount())
        .sum();

    let total_distance: Decimal = operations.iter().map(|o| o.distance_traveled()).sum();
    let total_passengers: i64 = operations.iter().map(|o| o.passenger_count() as i64).sum();
    let operating_cost = total_fuel_cost + total_maintenance_cost;
    let net_profit = total_revenue - operating_cost;

    CostAnalysis {
        period: format!("Last {} days", days),
        total_revenue,
        total_fuel_cost,
        total_maintenance_cost,
        total_operating_cost: operating_cost,
        net_profit,
        profit_margin: safe_div(net_profit, total_revenue) * Decimal::from(100),
        fuel_cost_per_mile: safe_div(total_fuel_cost, total_distance),
        cost_per_passenger: safe_div(operating_cost, Decimal::from(total_passengers)),
    }
}

pub fn bus_performance(buses: &[Bus], operations: &[DailyOperation]) -> Vec<BusPerformance> {
    let mut by_bus: HashMap<Uuid, Vec<&DailyOperation>> = HashMap::new();
    for op in operations {
        by_bus.entry(op.bus_id()).or_default().push(op);
    }

    let mut performance: Vec<BusPerformance> = by_bus
        .into_iter()
        .map(|(bus_id, ops)| {
            let distance: Decimal = ops.iter().map(|o| o.distance_traveled()).sum();
            let fuel: Decimal = ops.iter().map(|o| o.fuel_consumed()).sum();
            let delays: Decimal = ops
                .iter()
                .map(|o| Decimal::from(o.delay_minutes()))
                .sum();
            let delayed = ops.iter().filter(|o| o.is_delayed()).count();
            let trip_count = ops.len();

            BusPerformance {
                bus_id: bus_id.to_string(),
                bus_number: buses
                    .iter()
                    .find(|b| b.id() == bus_id)
                    .map(|b| b.bus_number().value().to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                total_operations: trip_count,
                total_passengers: ops.iter().map(|o| o.passenger_count() as i64).sum(),
                total_distance: distance,
                average_fuel_efficiency: safe_div(distance, fuel),
                total_revenue: ops.iter().map(|o| o.revenue().amount()).sum(),
                total_fuel_cost: ops.iter().map(|o| o.fuel_cost().amount()).sum(),
                average_delay_minutes: safe_div(delays, Decimal::from(trip_count)),
                on_time_percentage: safe_div(
                    Decimal::from((trip_count - delayed) as i64),
                    Decimal::from(trip_count as i64),
                ) * Decimal::from(100),
            }
        })
        .collect();

    performance.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
    performance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::route::Route;
    use crate::models::value_objects::{BusNumber, Money};
    use chrono::{Duration, NaiveTime};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn bus(number: &str, now: DateTime<Utc>) -> Bus {
        let (bus, _) = Bus::create(
            BusNumber::create(number).unwrap(),
            "Nova Bus LFS",
            2021,
            50,
            dec("100"),
            now - Duration::days(10),
            Money::usd(dec("420000")).unwrap(),
            now,
        )
        .unwrap();
        bus
    }

    fn operation(
        bus: &Bus,
        date: NaiveDate,
        passengers: i32,
        delay: i32,
        revenue: &str,
        now: DateTime<Utc>,
    ) -> DailyOperation {
        let route = Route::create(
            "R-1",
            "Loop",
            dec("10"),
            40,
            8,
            "A",
            "B",
            Money::usd(dec("30")).unwrap(),
            now,
        )
        .unwrap();
        DailyOperation::create(
            bus.id(),
            route.id(),
            date,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            passengers,
            dec("10"),
            dec("60"),
            delay,
            "Driver",
            Money::usd(dec(revenue)).unwrap(),
            Money::usd(dec("31.20")).unwrap(),
            None,
            now,
        )
        .unwrap()
    }

    #[test]
    fn kpis_aggregate_window_totals() {
        let now = Utc::now();
        let b = bus("BUS-001", now);
        let yesterday = now.date_naive() - Duration::days(1);
        let ops = vec![
            operation(&b, yesterday, 40, 0, "120", now),
            operation(&b, yesterday, 20, 12, "60", now),
        ];

        let kpis = kpis(&[b], &ops, now);
        assert_eq!(kpis.total_operations_last_30_days, 2);
        assert_eq!(kpis.total_passengers_last_30_days, 60);
        assert_eq!(kpis.total_revenue_last_30_days, dec("180"));
        assert_eq!(kpis.net_profit_last_30_days, dec("180") - dec("62.40"));
        assert_eq!(kpis.average_fuel_efficiency_mpg, dec("6"));
        assert_eq!(kpis.on_time_percentage, dec("50"));
    }

    #[test]
    fn kpis_on_empty_window_defaults_to_full_on_time() {
        let now = Utc::now();
        let kpis = kpis(&[], &[], now);
        assert_eq!(kpis.on_time_percentage, dec("100"));
        assert_eq!(kpis.average_fuel_efficiency_mpg, Decimal::ZERO);
    }

    #[test]
    fn fleet_status_counts_by_state_and_averages_real_delays() {
        let now = Utc::now();
        let active = bus("BUS-001", now);
        let mut shop = bus("BUS-002", now);
        shop.schedule_maintenance(now + Duration::days(1), "Routine", "oil", now)
            .unwrap();
        let mut gone = bus("BUS-003", now);
        gone.retire("age", now).unwrap();

        let today = now.date_naive();
        let ops = vec![
            operation(&active, today, 30, 0, "90", now),
            operation(&active, today, 30, 10, "90", now),
            operation(&active, today, 30, 20, "90", now),
        ];

        let status = fleet_status(&[active, shop, gone], &ops, now);
        assert_eq!(status.total_buses, 3);
        assert_eq!(status.active_buses, 1);
        assert_eq!(status.in_maintenance, 1);
        assert_eq!(status.retired, 1);
        assert_eq!(status.delays_today, 2);
        // Media solo sobre los viajes retrasados: (10+20)/2
        assert_eq!(status.average_delay_minutes, dec("15"));
    }

    #[test]
    fn trends_group_by_day_in_order() {
        let now = Utc::now();
        let b = bus("BUS-001", now);
        let d1 = now.date_naive() - Duration::days(3);
        let d2 = now.date_naive() - Duration::days(1);
        let ops = vec![
            operation(&b, d2, 25, 0, "75", now),
            operation(&b, d1, 35, 0, "105", now),
            operation(&b, d1, 15, 0, "45", now),
        ];

        let fuel_trends = fuel_efficiency_trends(&ops);
        assert_eq!(fuel_trends.len(), 2);
        assert_eq!(fuel_trends[0].date, d1);
        assert_eq!(fuel_trends[0].operation_count, 2);
        assert_eq!(fuel_trends[0].average_mpg, dec("6"));

        let riders = ridership_trends(&ops);
        assert_eq!(riders[0].total_passengers, 50);
        assert_eq!(riders[0].average_passengers_per_trip, dec("25"));
        assert_eq!(riders[1].total_passengers, 25);
    }

    #[test]
    fn cost_analysis_includes_window_maintenance() {
        let now = Utc::now();
        let mut b = bus("BUS-001", now);
        b.schedule_maintenance(now + Duration::days(1), "Routine", "brakes", now)
            .unwrap();
        b.complete_maintenance(Money::usd(dec("500")).unwrap(), "Garage", None, 3, now)
            .unwrap();

        let ops = vec![operation(&b, now.date_naive(), 30, 0, "200", now)];
        let analysis = cost_analysis(&[b], &ops, now - Duration::days(30), 30);

        assert_eq!(analysis.total_maintenance_cost, dec("500"));
        assert_eq!(analysis.total_operating_cost, dec("531.20"));
        assert_eq!(analysis.net_profit, dec("200") - dec("531.20"));
    }

    #[test]
    fn bus_performance_ordered_by_revenue() {
        let now = Utc::now();
        let b1 = bus("BUS-001", now);
        let b2 = bus("BUS-002", now);
        let date = now.date_naive();
        let ops = vec![
            operation(&b1, date, 30, 0, "50", now),
            operation(&b2, date, 30, 5, "300", now),
        ];

        let performance = bus_performance(&[b1, b2], &ops);
        assert_eq!(performance.len(), 2);
        assert_eq!(performance[0].bus_number, "BUS-002");
        assert_eq!(performance[0].on_time_percentage, Decimal::ZERO);
        assert_eq!(performance[1].on_time_percentage, dec("100"));
    }
}
