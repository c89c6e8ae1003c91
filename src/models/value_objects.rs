//! Value objects del dominio
//!
//! Money, BusNumber y FuelEfficiency son wrappers inmutables que se validan
//! en su única vía de construcción (`create`). La aritmética de Money con
//! monedas distintas es un error de programación y hace panic.

use std::fmt;
use std::ops::{Add, Sub};

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DomainError, DomainResult};

lazy_static! {
    static ref BUS_NUMBER_RE: Regex = Regex::new(r"^[A-Z0-9-]+$").unwrap();
}

/// Cantidad monetaria con código de moneda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn create(amount: Decimal, currency: &str) -> DomainResult<Self> {
        if amount < Decimal::ZERO {
            return Err(DomainError::new("Amount cannot be negative"));
        }
        if currency.trim().is_empty() {
            return Err(DomainError::new("Currency cannot be empty"));
        }
        Ok(Self {
            amount,
            currency: currency.to_uppercase(),
        })
    }

    pub fn usd(amount: Decimal) -> DomainResult<Self> {
        Self::create(amount, "USD")
    }

    pub fn zero() -> Self {
        Self {
            amount: Decimal::ZERO,
            currency: "USD".to_string(),
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        if self.currency != other.currency {
            panic!(
                "Cannot add money with different currencies: {} and {}",
                self.currency, other.currency
            );
        }
        Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        }
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        if self.currency != other.currency {
            panic!(
                "Cannot subtract money with different currencies: {} and {}",
                self.currency, other.currency
            );
        }
        let result = self.amount - other.amount;
        if result < Decimal::ZERO {
            panic!("Result cannot be negative");
        }
        Money {
            amount: result,
            currency: self.currency,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

/// Número identificador de bus, normalizado a mayúsculas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusNumber(String);

impl BusNumber {
    pub fn create(value: &str) -> DomainResult<Self> {
        if value.trim().is_empty() {
            return Err(DomainError::new("Bus number cannot be empty"));
        }
        if value.len() < 3 || value.len() > 20 {
            return Err(DomainError::new(
                "Bus number must be between 3 and 20 characters",
            ));
        }
        if !BUS_NUMBER_RE.is_match(value) {
            return Err(DomainError::new(
                "Bus number can only contain uppercase letters, numbers, and hyphens",
            ));
        }
        Ok(Self(value.to_uppercase()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Eficiencia de combustible en millas por galón.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelEfficiency {
    miles_per_gallon: Decimal,
}

impl FuelEfficiency {
    pub fn create(distance: Decimal, fuel_consumed: Decimal) -> DomainResult<Self> {
        if distance <= Decimal::ZERO {
            return Err(DomainError::new("Distance must be greater than zero"));
        }
        if fuel_consumed <= Decimal::ZERO {
            return Err(DomainError::new("Fuel consumed must be greater than zero"));
        }
        let mpg = distance / fuel_consumed;
        // Rango razonable para buses
        if mpg < Decimal::ONE || mpg > Decimal::from(50) {
            return Err(DomainError::new(format!(
                "Fuel efficiency {:.2} MPG is outside reasonable range (1-50 MPG)",
                mpg
            )));
        }
        Ok(Self {
            miles_per_gallon: mpg,
        })
    }

    pub fn miles_per_gallon(&self) -> Decimal {
        self.miles_per_gallon
    }

    pub fn is_efficient(&self) -> bool {
        self.miles_per_gallon >= Decimal::from(6)
    }

    pub fn needs_attention(&self) -> bool {
        self.miles_per_gallon < Decimal::from(4)
    }
}

impl fmt::Display for FuelEfficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} MPG", self.miles_per_gallon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn money_create_rejects_negative_amount() {
        let result = Money::create(dec("-1"), "USD");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("negative"));
    }

    #[test]
    fn money_create_uppercases_currency() {
        let money = Money::create(dec("10.50"), "usd").unwrap();
        assert_eq!(money.currency(), "USD");
        assert_eq!(money.amount(), dec("10.50"));
    }

    #[test]
    fn money_create_rejects_blank_currency() {
        assert!(Money::create(dec("1"), "  ").is_err());
    }

    #[test]
    fn money_add_same_currency() {
        let a = Money::usd(dec("10")).unwrap();
        let b = Money::usd(dec("2.50")).unwrap();
        assert_eq!((a + b).amount(), dec("12.50"));
    }

    #[test]
    #[should_panic(expected = "different currencies")]
    fn money_add_different_currency_panics() {
        let a = Money::create(dec("10"), "USD").unwrap();
        let b = Money::create(dec("10"), "EUR").unwrap();
        let _ = a + b;
    }

    #[test]
    #[should_panic(expected = "different currencies")]
    fn money_sub_different_currency_panics() {
        let a = Money::create(dec("10"), "USD").unwrap();
        let b = Money::create(dec("1"), "EUR").unwrap();
        let _ = a - b;
    }

    #[test]
    #[should_panic(expected = "Result cannot be negative")]
    fn money_sub_negative_result_panics() {
        let a = Money::usd(dec("5")).unwrap();
        let b = Money::usd(dec("10")).unwrap();
        let _ = a - b;
    }

    #[test]
    fn bus_number_valid_input_is_stored_uppercased() {
        let number = BusNumber::create("BUS-001").unwrap();
        assert_eq!(number.value(), "BUS-001");
    }

    #[test]
    fn bus_number_rejects_empty() {
        let err = BusNumber::create("   ").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn bus_number_rejects_bad_length() {
        let err = BusNumber::create("AB").unwrap_err();
        assert!(err.to_string().contains("between 3 and 20"));
        let err = BusNumber::create(&"X".repeat(21)).unwrap_err();
        assert!(err.to_string().contains("between 3 and 20"));
    }

    #[test]
    fn bus_number_rejects_invalid_characters() {
        let err = BusNumber::create("bus_01!").unwrap_err();
        assert!(err.to_string().contains("uppercase letters"));
    }

    #[test]
    fn fuel_efficiency_divides_distance_by_fuel() {
        let eff = FuelEfficiency::create(dec("120"), dec("20")).unwrap();
        assert_eq!(eff.miles_per_gallon(), dec("6"));
        assert!(eff.is_efficient());
        assert!(!eff.needs_attention());
    }

    #[test]
    fn fuel_efficiency_rejects_out_of_range() {
        assert!(FuelEfficiency::create(dec("1000"), dec("1")).is_err());
        assert!(FuelEfficiency::create(dec("1"), dec("2")).is_err());
        assert!(FuelEfficiency::create(dec("0"), dec("2")).is_err());
        assert!(FuelEfficiency::create(dec("10"), dec("0")).is_err());
    }
}
