//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::services::payment_provider::PaymentProviderClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub payments: Arc<PaymentProviderClient>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        let payments = Arc::new(PaymentProviderClient::new(
            config.payment_provider_url.clone(),
            config.payment_provider_secret.clone(),
        ));

        Self {
            pool,
            config,
            payments,
        }
    }
}
