//! Car Rental API
//!
//! Backend de reservas de alquiler de coches: flota, ciclo de vida de
//! alquileres y reconciliación de pagos contra un proveedor externo.

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

use axum::{response::Json, routing::get, Router};
use serde_json::json;

use middleware::cors::{cors_middleware, cors_middleware_with_origins};
use state::AppState;

/// Construir el router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    let cors = if state.config.is_production() {
        cors_middleware_with_origins(state.config.cors_origins.clone())
    } else {
        cors_middleware()
    };

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", routes::auth_routes::create_auth_router(state.clone()))
        .nest("/api/cars", routes::car_routes::create_car_router(state.clone()))
        .nest("/api/rentals", routes::rental_routes::create_rental_router(state.clone()))
        .nest("/api/payments", routes::payment_routes::create_payment_router(state.clone()))
        .layer(cors)
        .with_state(state)
}

/// Health check simple
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "service": "car-rental-api",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
