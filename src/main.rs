use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use dotenvy::dotenv;

use fleet_management::config::environment::EnvironmentConfig;
use fleet_management::database;
use fleet_management::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use fleet_management::routes;
use fleet_management::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚌 Fleet Management - Backend de gestión de flota");
    info!("=================================================");

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    if let Err(e) = database::connection::run_migrations(&pool).await {
        error!("❌ Error aplicando migraciones: {}", e);
        return Err(e);
    }
    info!("✅ Base de datos lista");

    let config = EnvironmentConfig::from_env();
    let port = config.port;

    // En producción solo se admiten los orígenes de CORS_ORIGINS; en
    // desarrollo el dashboard entra desde cualquier origen
    let cors = if config.is_production() {
        cors_middleware_with_origins(config.cors_origins.clone())
    } else {
        cors_middleware()
    };

    let app_state = AppState::new(pool, config);

    let app = routes::create_app_router()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(tower::limit::ConcurrencyLimitLayer::new(512))
        .layer(cors)
        .with_state(app_state);

    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚌 Endpoints - Bus:");
    info!("   POST /api/bus - Dar de alta un bus");
    info!("   GET  /api/bus - Listar buses");
    info!("   GET  /api/bus/:id - Obtener bus");
    info!("   GET  /api/bus/status/:status - Buses por estado");
    info!("   GET  /api/bus/maintenance/required - Buses con mantenimiento pendiente");
    info!("   GET  /api/bus/statistics - Estadísticas de flota");
    info!("   PUT  /api/bus/:id/mileage - Actualizar kilometraje");
    info!("   POST /api/bus/:id/maintenance/schedule - Programar mantenimiento");
    info!("   POST /api/bus/:id/maintenance/complete - Completar mantenimiento");
    info!("   POST /api/bus/:id/retire - Retirar bus");
    info!("   POST /api/bus/:id/reactivate - Reactivar bus");
    info!("   POST /api/bus/:id/out-of-service - Marcar fuera de servicio");
    info!("🗺  Endpoints - Route:");
    info!("   POST /api/route - Crear ruta");
    info!("   GET  /api/route - Listar rutas (?active=true)");
    info!("   POST /api/route/:id/activate | /deactivate - Cambiar estado");
    info!("   PUT  /api/route/:id - Actualizar coste de combustible");
    info!("🚏 Endpoints - Operation:");
    info!("   POST /api/operation - Registrar viaje");
    info!("   GET  /api/operation?days=N - Viajes de la ventana");
    info!("   GET  /api/operation/bus/:id | /route/:id | /delayed");
    info!("📊 Endpoints - Business Insights:");
    info!("   GET  /api/businessinsights/fuel-wasters?days=N");
    info!("   GET  /api/businessinsights/empty-buses?days=N");
    info!("   GET  /api/businessinsights/driver-performance?days=N");
    info!("   GET  /api/businessinsights/maintenance-alerts");
    info!("   GET  /api/businessinsights/route-optimization?days=N");
    info!("   GET  /api/businessinsights/roi-summary?days=N");
    info!("   GET  /api/businessinsights/narrative?days=N");
    info!("📈 Endpoints - Dashboard:");
    info!("   GET  /api/dashboard/kpis | /fleet-status | /cost-analysis");
    info!("   GET  /api/dashboard/fuel-efficiency-trends | /ridership-trends");
    info!("   GET  /api/dashboard/bus-performance");
    info!("📟 Métricas Prometheus:");
    info!("   GET  /metrics");
    info!("🌱 Datos de prueba:");
    info!("   POST /api/seed/mock-data");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
