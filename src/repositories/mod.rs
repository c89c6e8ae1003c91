//! Repositorios de persistencia
//!
//! Todo el SQL vive aquí. Las filas se rehidratan a agregados mediante los
//! constructores `restore` del dominio; nunca se toca estado privado.

pub mod bus_repository;
pub mod operation_repository;
pub mod route_repository;
