use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use car_rental_api::config::environment::EnvironmentConfig;
use car_rental_api::state::AppState;
use car_rental_api::{create_app, database};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚗 Car Rental API - Backend de reservas");
    info!("========================================");

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    // Crear router de la API
    let app_state = AppState::new(pool, EnvironmentConfig::default());
    let app = create_app(app_state);

    // Puerto del servidor
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔐 Endpoints - Auth:");
    info!("   POST /api/auth/register - Registrar usuario");
    info!("   POST /api/auth/login - Login");
    info!("   POST /api/auth/logout - Logout");
    info!("   GET  /api/auth/user - Usuario actual");
    info!("🚗 Endpoints - Cars:");
    info!("   GET  /api/cars - Listar coches (público)");
    info!("   GET  /api/cars/:id - Obtener coche (público)");
    info!("   POST /api/cars - Crear coche (admin)");
    info!("   PUT  /api/cars/:id - Actualizar coche (admin)");
    info!("   DELETE /api/cars/:id - Eliminar coche (admin)");
    info!("📅 Endpoints - Rentals:");
    info!("   POST /api/rentals - Crear alquiler");
    info!("   GET  /api/rentals - Listar alquileres propios");
    info!("   GET  /api/rentals/:id - Obtener alquiler");
    info!("   PUT  /api/rentals/:id - Actualizar alquiler");
    info!("   DELETE /api/rentals/:id - Borrar alquiler");
    info!("💳 Endpoints - Payments:");
    info!("   POST /api/payments/create-intent - Crear payment intent");
    info!("   POST /api/payments/confirm - Confirmar pago");
    info!("   GET  /api/payments/rental/:rental_id - Pagos de un alquiler");

    // Iniciar servidor
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!("Error del servidor: {}", e)
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
