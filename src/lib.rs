//! Backend de gestión de flota de buses
//!
//! CRUD de buses/rutas/operaciones diarias, motor de reportes de negocio,
//! dashboard y exposición Prometheus sobre PostgreSQL.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
