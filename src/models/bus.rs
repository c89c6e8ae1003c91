//! Agregado Bus
//!
//! Raíz de agregado con su máquina de estados (Active → Maintenance →
//! Active/Retired) y los registros de mantenimiento que posee. Los eventos
//! de dominio se devuelven explícitamente al caller; no hay colección
//! oculta de eventos en la entidad.

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{BusNumber, Money};
use super::{DomainError, DomainResult};

/// Millas recorridas desde la última actualización que disparan el aviso
/// de mantenimiento cuando la fecha prevista ya pasó.
const MAINTENANCE_MILEAGE_DELTA: i32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusStatus {
    Active,
    Maintenance,
    Retired,
    OutOfService,
}

impl BusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusStatus::Active => "active",
            BusStatus::Maintenance => "maintenance",
            BusStatus::Retired => "retired",
            BusStatus::OutOfService => "out_of_service",
        }
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        match value.to_lowercase().as_str() {
            "active" => Ok(BusStatus::Active),
            "maintenance" => Ok(BusStatus::Maintenance),
            "retired" => Ok(BusStatus::Retired),
            "out_of_service" | "outofservice" => Ok(BusStatus::OutOfService),
            other => Err(DomainError::new(format!("Invalid bus status: {}", other))),
        }
    }
}

/// Evento de dominio devuelto por las operaciones del agregado.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    Created {
        bus_id: Uuid,
        bus_number: String,
        model: String,
    },
    MaintenanceRequired {
        bus_id: Uuid,
        bus_number: String,
        current_mileage: i32,
    },
    MaintenanceScheduled {
        bus_id: Uuid,
        bus_number: String,
        maintenance_date: DateTime<Utc>,
        maintenance_type: String,
    },
    MaintenanceCompleted {
        bus_id: Uuid,
        bus_number: String,
        cost: Money,
        downtime_hours: i32,
    },
    Retired {
        bus_id: Uuid,
        bus_number: String,
        reason: String,
    },
    MarkedOutOfService {
        bus_id: Uuid,
        bus_number: String,
        reason: String,
    },
}

/// Registro de mantenimiento, propiedad exclusiva de un Bus.
/// Solo se crea a través de `Bus::complete_maintenance` (o `restore` al
/// rehidratar desde el almacén) y es inmutable después.
#[derive(Debug, Clone)]
pub struct MaintenanceRecord {
    id: Uuid,
    bus_id: Uuid,
    maintenance_date: DateTime<Utc>,
    maintenance_type: String,
    description: String,
    cost: Money,
    mileage_at_maintenance: i32,
    performed_by: String,
    parts_replaced: Option<String>,
    downtime_hours: i32,
    is_warranty: bool,
    created_at: DateTime<Utc>,
}

impl MaintenanceRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        bus_id: Uuid,
        maintenance_date: DateTime<Utc>,
        maintenance_type: &str,
        description: &str,
        cost: Money,
        mileage_at_maintenance: i32,
        performed_by: &str,
        parts_replaced: Option<String>,
        downtime_hours: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if maintenance_date > now {
            return Err(DomainError::new("Maintenance date cannot be in the future"));
        }
        if maintenance_type.trim().is_empty() {
            return Err(DomainError::new("Maintenance type cannot be empty"));
        }
        if description.trim().is_empty() {
            return Err(DomainError::new("Description cannot be empty"));
        }
        if performed_by.trim().is_empty() {
            return Err(DomainError::new("Performed by cannot be empty"));
        }
        if downtime_hours < 0 {
            return Err(DomainError::new("Downtime hours cannot be negative"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            bus_id,
            maintenance_date,
            maintenance_type: maintenance_type.to_string(),
            description: description.to_string(),
            cost,
            mileage_at_maintenance,
            performed_by: performed_by.to_string(),
            parts_replaced,
            downtime_hours,
            is_warranty: false,
            created_at: now,
        })
    }

    /// Rehidratación desde el almacén; no aplica validaciones.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        bus_id: Uuid,
        maintenance_date: DateTime<Utc>,
        maintenance_type: String,
        description: String,
        cost: Money,
        mileage_at_maintenance: i32,
        performed_by: String,
        parts_replaced: Option<String>,
        downtime_hours: i32,
        is_warranty: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            bus_id,
            maintenance_date,
            maintenance_type,
            description,
            cost,
            mileage_at_maintenance,
            performed_by,
            parts_replaced,
            downtime_hours,
            is_warranty,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn bus_id(&self) -> Uuid {
        self.bus_id
    }
    pub fn maintenance_date(&self) -> DateTime<Utc> {
        self.maintenance_date
    }
    pub fn maintenance_type(&self) -> &str {
        &self.maintenance_type
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn cost(&self) -> &Money {
        &self.cost
    }
    pub fn mileage_at_maintenance(&self) -> i32 {
        self.mileage_at_maintenance
    }
    pub fn performed_by(&self) -> &str {
        &self.performed_by
    }
    pub fn parts_replaced(&self) -> Option<&str> {
        self.parts_replaced.as_deref()
    }
    pub fn downtime_hours(&self) -> i32 {
        self.downtime_hours
    }
    pub fn is_warranty(&self) -> bool {
        self.is_warranty
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Raíz de agregado Bus.
#[derive(Debug, Clone)]
pub struct Bus {
    id: Uuid,
    bus_number: BusNumber,
    model: String,
    year: i32,
    capacity: i32,
    fuel_tank_capacity: Decimal,
    status: BusStatus,
    purchase_date: DateTime<Utc>,
    purchase_price: Money,
    current_mileage: i32,
    last_maintenance_date: DateTime<Utc>,
    next_maintenance_date: DateTime<Utc>,
    maintenance_records: Vec<MaintenanceRecord>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Bus {
    pub fn create(
        bus_number: BusNumber,
        model: &str,
        year: i32,
        capacity: i32,
        fuel_tank_capacity: Decimal,
        purchase_date: DateTime<Utc>,
        purchase_price: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<(Self, BusEvent)> {
        use chrono::Datelike;

        if model.trim().is_empty() {
            return Err(DomainError::new("Bus model cannot be empty"));
        }
        let current_year = now.year();
        if year < 2000 || year > current_year + 1 {
            return Err(DomainError::new(format!(
                "Bus year must be between 2000 and {}",
                current_year + 1
            )));
        }
        if !(10..=100).contains(&capacity) {
            return Err(DomainError::new(
                "Bus capacity must be between 10 and 100 passengers",
            ));
        }
        if fuel_tank_capacity <= Decimal::ZERO || fuel_tank_capacity > Decimal::from(200) {
            return Err(DomainError::new(
                "Fuel tank capacity must be between 0 and 200 gallons",
            ));
        }
        if purchase_date > now {
            return Err(DomainError::new("Purchase date cannot be in the future"));
        }

        let bus = Self {
            id: Uuid::new_v4(),
            bus_number,
            model: model.to_string(),
            year,
            capacity,
            fuel_tank_capacity,
            status: BusStatus::Active,
            purchase_date,
            purchase_price,
            current_mileage: 0,
            last_maintenance_date: purchase_date,
            // Primer mantenimiento a los 3 meses de la compra
            next_maintenance_date: add_months(purchase_date, 3),
            maintenance_records: Vec::new(),
            created_at: now,
            updated_at: None,
        };

        let event = BusEvent::Created {
            bus_id: bus.id,
            bus_number: bus.bus_number.value().to_string(),
            model: bus.model.clone(),
        };

        Ok((bus, event))
    }

    /// Rehidratación desde el almacén o carga masiva del seeder; los datos
    /// ya fueron validados al persistirse.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        bus_number: BusNumber,
        model: String,
        year: i32,
        capacity: i32,
        fuel_tank_capacity: Decimal,
        status: BusStatus,
        purchase_date: DateTime<Utc>,
        purchase_price: Money,
        current_mileage: i32,
        last_maintenance_date: DateTime<Utc>,
        next_maintenance_date: DateTime<Utc>,
        maintenance_records: Vec<MaintenanceRecord>,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            bus_number,
            model,
            year,
            capacity,
            fuel_tank_capacity,
            status,
            purchase_date,
            purchase_price,
            current_mileage,
            last_maintenance_date,
            next_maintenance_date,
            maintenance_records,
            created_at,
            updated_at,
        }
    }

    pub fn update_mileage(
        &mut self,
        new_mileage: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<BusEvent>> {
        if new_mileage < self.current_mileage {
            return Err(DomainError::new(
                "New mileage cannot be less than current mileage",
            ));
        }

        let old_mileage = self.current_mileage;
        self.current_mileage = new_mileage;
        self.mark_updated(now);

        if self.current_mileage - old_mileage > MAINTENANCE_MILEAGE_DELTA
            && now >= self.next_maintenance_date
        {
            return Ok(Some(BusEvent::MaintenanceRequired {
                bus_id: self.id,
                bus_number: self.bus_number.value().to_string(),
                current_mileage: self.current_mileage,
            }));
        }

        Ok(None)
    }

    pub fn schedule_maintenance(
        &mut self,
        maintenance_date: DateTime<Utc>,
        maintenance_type: &str,
        _description: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<BusEvent> {
        if maintenance_date < now {
            return Err(DomainError::new("Maintenance date cannot be in the past"));
        }
        if self.status == BusStatus::Retired {
            return Err(DomainError::new(
                "Cannot schedule maintenance for retired bus",
            ));
        }

        self.status = BusStatus::Maintenance;
        self.next_maintenance_date = maintenance_date;
        self.mark_updated(now);

        Ok(BusEvent::MaintenanceScheduled {
            bus_id: self.id,
            bus_number: self.bus_number.value().to_string(),
            maintenance_date,
            maintenance_type: maintenance_type.to_string(),
        })
    }

    pub fn complete_maintenance(
        &mut self,
        cost: Money,
        performed_by: &str,
        parts_replaced: Option<String>,
        downtime_hours: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<BusEvent> {
        if self.status != BusStatus::Maintenance {
            return Err(DomainError::new("Bus is not in maintenance status"));
        }

        let record = MaintenanceRecord::create(
            self.id,
            now,
            "Routine",
            "Scheduled maintenance completed",
            cost.clone(),
            self.current_mileage,
            performed_by,
            parts_replaced,
            downtime_hours,
            now,
        )?;

        self.maintenance_records.push(record);
        self.last_maintenance_date = now;
        self.next_maintenance_date = add_months(now, 3);
        self.status = BusStatus::Active;
        self.mark_updated(now);

        Ok(BusEvent::MaintenanceCompleted {
            bus_id: self.id,
            bus_number: self.bus_number.value().to_string(),
            cost,
            downtime_hours,
        })
    }

    pub fn retire(&mut self, reason: &str, now: DateTime<Utc>) -> DomainResult<BusEvent> {
        if self.status == BusStatus::Retired {
            return Err(DomainError::new("Bus is already retired"));
        }

        self.status = BusStatus::Retired;
        self.mark_updated(now);

        Ok(BusEvent::Retired {
            bus_id: self.id,
            bus_number: self.bus_number.value().to_string(),
            reason: reason.to_string(),
        })
    }

    pub fn reactivate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != BusStatus::Retired {
            return Err(DomainError::new("Only retired buses can be reactivated"));
        }

        self.status = BusStatus::Active;
        self.mark_updated(now);
        Ok(())
    }

    /// Transición externa (p. ej. inspección fallida). La vuelta al servicio
    /// pasa por schedule/complete maintenance.
    pub fn mark_out_of_service(
        &mut self,
        reason: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<BusEvent> {
        if self.status == BusStatus::Retired {
            return Err(DomainError::new(
                "Cannot take a retired bus out of service",
            ));
        }

        self.status = BusStatus::OutOfService;
        self.mark_updated(now);

        Ok(BusEvent::MarkedOutOfService {
            bus_id: self.id,
            bus_number: self.bus_number.value().to_string(),
            reason: reason.to_string(),
        })
    }

    /// Carga masiva de historial de mantenimiento (seeder / importación).
    /// Los registros deben pertenecer a este bus.
    pub fn import_maintenance_history(
        &mut self,
        records: Vec<MaintenanceRecord>,
    ) -> DomainResult<()> {
        if records.iter().any(|r| r.bus_id() != self.id) {
            return Err(DomainError::new(
                "Maintenance record does not belong to this bus",
            ));
        }
        self.maintenance_records.extend(records);
        self.maintenance_records
            .sort_by_key(|r| r.maintenance_date());
        Ok(())
    }

    pub fn requires_maintenance(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_maintenance_date || self.status == BusStatus::Maintenance
    }

    /// Días hasta el próximo mantenimiento; negativo si ya venció.
    pub fn days_until_maintenance(&self, now: DateTime<Utc>) -> i32 {
        (self.next_maintenance_date - now).num_days() as i32
    }

    fn mark_updated(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn bus_number(&self) -> &BusNumber {
        &self.bus_number
    }
    pub fn model(&self) -> &str {
        &self.model
    }
    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn capacity(&self) -> i32 {
        self.capacity
    }
    pub fn fuel_tank_capacity(&self) -> Decimal {
        self.fuel_tank_capacity
    }
    pub fn status(&self) -> BusStatus {
        self.status
    }
    pub fn purchase_date(&self) -> DateTime<Utc> {
        self.purchase_date
    }
    pub fn purchase_price(&self) -> &Money {
        &self.purchase_price
    }
    pub fn current_mileage(&self) -> i32 {
        self.current_mileage
    }
    pub fn last_maintenance_date(&self) -> DateTime<Utc> {
        self.last_maintenance_date
    }
    pub fn next_maintenance_date(&self) -> DateTime<Utc> {
        self.next_maintenance_date
    }
    pub fn maintenance_records(&self) -> &[MaintenanceRecord] {
        &self.maintenance_records
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

fn add_months(date: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn new_bus(now: DateTime<Utc>) -> Bus {
        let number = BusNumber::create("BUS-001").unwrap();
        let price = Money::usd(dec("450000")).unwrap();
        let (bus, event) = Bus::create(
            number,
            "New Flyer Xcelsior",
            2022,
            50,
            dec("100"),
            now - Duration::days(400),
            price,
            now,
        )
        .unwrap();
        assert!(matches!(event, BusEvent::Created { .. }));
        bus
    }

    #[test]
    fn create_starts_active_with_first_maintenance_in_three_months() {
        let now = Utc::now();
        let bus = new_bus(now);
        assert_eq!(bus.status(), BusStatus::Active);
        assert_eq!(bus.current_mileage(), 0);
        assert_eq!(bus.last_maintenance_date(), bus.purchase_date());
        assert_eq!(
            bus.next_maintenance_date(),
            add_months(bus.purchase_date(), 3)
        );
    }

    #[test]
    fn create_validates_fields() {
        let now = Utc::now();
        let number = || BusNumber::create("BUS-002").unwrap();
        let price = || Money::usd(dec("100000")).unwrap();

        let err = Bus::create(number(), "  ", 2022, 50, dec("100"), now, price(), now)
            .unwrap_err();
        assert!(err.to_string().contains("model"));

        let err = Bus::create(number(), "Gillig", 1999, 50, dec("100"), now, price(), now)
            .unwrap_err();
        assert!(err.to_string().contains("year"));

        let err = Bus::create(number(), "Gillig", 2022, 5, dec("100"), now, price(), now)
            .unwrap_err();
        assert!(err.to_string().contains("capacity"));

        let err = Bus::create(number(), "Gillig", 2022, 50, dec("250"), now, price(), now)
            .unwrap_err();
        assert!(err.to_string().contains("tank"));

        let err = Bus::create(
            number(),
            "Gillig",
            2022,
            50,
            dec("100"),
            now + Duration::days(1),
            price(),
            now,
        )
        .unwrap_err();
        assert!(err.to_string().contains("future"));
    }

    #[test]
    fn update_mileage_rejects_lower_value() {
        let now = Utc::now();
        let mut bus = new_bus(now);
        bus.update_mileage(1000, now).unwrap();
        let err = bus.update_mileage(500, now).unwrap_err();
        assert!(err.to_string().contains("less than current"));
        assert_eq!(bus.current_mileage(), 1000);
    }

    #[test]
    fn update_mileage_emits_maintenance_required_when_overdue_and_big_delta() {
        let now = Utc::now();
        // La fecha de mantenimiento (compra + 3 meses) ya pasó
        let mut bus = new_bus(now);
        let event = bus.update_mileage(6000, now).unwrap();
        assert!(matches!(
            event,
            Some(BusEvent::MaintenanceRequired { current_mileage: 6000, .. })
        ));

        // Delta pequeño: sin evento
        let event = bus.update_mileage(6500, now).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn schedule_maintenance_rejects_past_date_and_retired_bus() {
        let now = Utc::now();
        let mut bus = new_bus(now);

        let err = bus
            .schedule_maintenance(now - Duration::days(1), "Routine", "oil", now)
            .unwrap_err();
        assert!(err.to_string().contains("past"));

        bus.retire("end of life", now).unwrap();
        let err = bus
            .schedule_maintenance(now + Duration::days(1), "Routine", "oil", now)
            .unwrap_err();
        assert!(err.to_string().contains("retired"));
    }

    #[test]
    fn maintenance_cycle_returns_bus_to_active() {
        let now = Utc::now();
        let mut bus = new_bus(now);
        let date = now + Duration::days(2);

        bus.schedule_maintenance(date, "Routine", "brake check", now)
            .unwrap();
        assert_eq!(bus.status(), BusStatus::Maintenance);
        assert_eq!(bus.next_maintenance_date(), date);

        // Completar fuera del estado Maintenance falla
        let mut active = new_bus(now);
        let err = active
            .complete_maintenance(Money::usd(dec("1500")).unwrap(), "City Garage", None, 4, now)
            .unwrap_err();
        assert!(err.to_string().contains("not in maintenance"));

        let event = bus
            .complete_maintenance(
                Money::usd(dec("1500")).unwrap(),
                "City Garage",
                Some("brake pads".to_string()),
                4,
                now,
            )
            .unwrap();
        assert!(matches!(event, BusEvent::MaintenanceCompleted { .. }));
        assert_eq!(bus.status(), BusStatus::Active);
        assert_eq!(bus.last_maintenance_date(), now);
        assert_eq!(bus.next_maintenance_date(), add_months(now, 3));
        assert_eq!(bus.maintenance_records().len(), 1);
        assert_eq!(bus.maintenance_records()[0].performed_by(), "City Garage");
    }

    #[test]
    fn retire_twice_fails_and_reactivate_requires_retired() {
        let now = Utc::now();
        let mut bus = new_bus(now);

        let err = bus.reactivate(now).unwrap_err();
        assert!(err.to_string().contains("retired"));

        bus.retire("too old", now).unwrap();
        let err = bus.retire("again", now).unwrap_err();
        assert!(err.to_string().contains("already retired"));

        bus.reactivate(now).unwrap();
        assert_eq!(bus.status(), BusStatus::Active);
    }

    #[test]
    fn out_of_service_recovers_through_maintenance() {
        let now = Utc::now();
        let mut bus = new_bus(now);

        bus.mark_out_of_service("failed inspection", now).unwrap();
        assert_eq!(bus.status(), BusStatus::OutOfService);

        bus.schedule_maintenance(now + Duration::days(1), "Inspection", "full check", now)
            .unwrap();
        assert_eq!(bus.status(), BusStatus::Maintenance);

        bus.complete_maintenance(Money::usd(dec("800")).unwrap(), "City Garage", None, 8, now)
            .unwrap();
        assert_eq!(bus.status(), BusStatus::Active);

        bus.retire("done", now).unwrap();
        let err = bus.mark_out_of_service("no", now).unwrap_err();
        assert!(err.to_string().contains("retired"));
    }

    #[test]
    fn requires_maintenance_and_days_until() {
        let now = Utc::now();
        let bus = new_bus(now);
        // Compra hace 400 días: el mantenimiento a 3 meses ya venció
        assert!(bus.requires_maintenance(now));
        assert!(bus.days_until_maintenance(now) < 0);

        let mut fresh = new_bus(now);
        fresh
            .schedule_maintenance(now + Duration::days(10), "Routine", "check", now)
            .unwrap();
        // En mantenimiento siempre lo requiere aunque la fecha sea futura
        assert!(fresh.requires_maintenance(now));
        assert_eq!(fresh.days_until_maintenance(now), 10);
    }
}
