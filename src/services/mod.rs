//! Servicios del sistema
//!
//! El motor de reportes y el dashboard son funciones puras sobre un
//! snapshot; el resto son integraciones (métricas, seeder, IA).

pub mod ai_service;
pub mod dashboard_service;
pub mod insights_service;
pub mod metrics_service;
pub mod seed_service;
