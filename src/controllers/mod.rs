//! Controladores
//!
//! Orquestan repositorios y servicios para cada recurso; las reglas de
//! negocio viven en los modelos y en los servicios de reporte.

pub mod bus_controller;
pub mod dashboard_controller;
pub mod insights_controller;
pub mod operation_controller;
pub mod route_controller;
pub mod seed_controller;
