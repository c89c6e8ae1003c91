//! DTOs de la API
//!
//! Requests validados con `validator` y responses serializables. Los tipos
//! de los reportes los produce directamente la capa de servicios.

pub mod bus_dto;
pub mod dashboard_dto;
pub mod insights_dto;
pub mod operation_dto;
pub mod route_dto;

use serde::Serialize;

// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

/// Ventana de días para los reportes (`?days=N`, 30 por defecto).
#[derive(Debug, serde::Deserialize)]
pub struct ReportWindow {
    pub days: Option<i64>,
}

impl ReportWindow {
    pub fn days_or_default(&self) -> i64 {
        self.days.unwrap_or(30).max(1)
    }
}
