//! Modelos de dominio del sistema
//!
//! Este módulo contiene los agregados (Bus, Route, DailyOperation) y los
//! value objects. Las factorías validan todas las reglas de negocio y
//! devuelven `Result<_, DomainError>`.

pub mod bus;
pub mod operation;
pub mod route;
pub mod value_objects;

use thiserror::Error;

/// Fallo de validación de dominio, con mensaje legible para el caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DomainError(pub String);

impl DomainError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
