//! Cliente del proveedor de pagos
//!
//! Este módulo habla con el proveedor externo de payment intents (API
//! compatible con Stripe). El core solo consume dos operaciones: crear un
//! intent y recuperar su importe/estado; ninguna otra forma de respuesta
//! del proveedor se filtra hacia arriba.
//!
//! El cliente HTTP lleva timeout acotado y nunca se invoca con locks de
//! base de datos abiertos.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Intent tal y como lo reporta el proveedor. El importe viene en céntimos
/// y es la fuente autoritativa; nunca se re-confía en el importe del cliente.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub client_secret: Option<String>,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }

    /// Importe del intent como Decimal con dos decimales
    pub fn amount_decimal(&self) -> Decimal {
        Decimal::new(self.amount, 2)
    }
}

pub struct PaymentProviderClient {
    base_url: String,
    secret_key: String,
    client: reqwest::Client,
}

impl PaymentProviderClient {
    pub fn new(base_url: String, secret_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            secret_key,
            client,
        }
    }

    /// Crear un payment intent por el importe indicado (en céntimos)
    pub async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        rental_id: Uuid,
    ) -> Result<PaymentIntent, AppError> {
        let url = format!("{}/v1/payment_intents", self.base_url);
        log::info!("💳 Creando payment intent de {} {} para alquiler {}", amount_cents, currency, rental_id);

        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", currency.to_string()),
            ("metadata[rental_id]", rental_id.to_string()),
        ];

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::PaymentProvider(format!("Error creating intent: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ El proveedor rechazó la creación del intent: {} {}", status, error_text);
            return Err(AppError::PaymentProvider(format!(
                "Intent creation failed with status {}",
                status
            )));
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| AppError::PaymentProvider(format!("Invalid intent response: {}", e)))?;

        Ok(intent)
    }

    /// Recuperar el estado e importe autoritativos de un intent existente
    pub async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, AppError> {
        let url = format!("{}/v1/payment_intents/{}", self.base_url, intent_id);
        log::info!("🔍 Consultando intent {} al proveedor", intent_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::PaymentProvider(format!("Error retrieving intent: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ El proveedor no devolvió el intent: {} {}", status, error_text);
            return Err(AppError::PaymentProvider(format!(
                "Intent lookup failed with status {}",
                status
            )));
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| AppError::PaymentProvider(format!("Invalid intent response: {}", e)))?;

        Ok(intent)
    }
}

/// Convertir un importe Decimal a céntimos para el proveedor
pub fn amount_to_cents(amount: Decimal) -> Result<i64, AppError> {
    (amount * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or_else(|| AppError::Internal(format!("Amount {} cannot be converted to cents", amount)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_to_cents() {
        assert_eq!(amount_to_cents(Decimal::new(25000, 2)).unwrap(), 25000);
        assert_eq!(amount_to_cents(Decimal::new(5, 1)).unwrap(), 50);
        assert_eq!(amount_to_cents(Decimal::from(3)).unwrap(), 300);
    }

    #[test]
    fn test_intent_amount_decimal() {
        let intent = PaymentIntent {
            id: "pi_123".to_string(),
            amount: 25000,
            currency: "usd".to_string(),
            status: "succeeded".to_string(),
            client_secret: None,
        };
        assert_eq!(intent.amount_decimal(), Decimal::new(25000, 2));
        assert!(intent.is_succeeded());
    }

    #[test]
    fn test_intent_not_succeeded() {
        let intent = PaymentIntent {
            id: "pi_456".to_string(),
            amount: 100,
            currency: "usd".to_string(),
            status: "requires_payment_method".to_string(),
            client_secret: None,
        };
        assert!(!intent.is_succeeded());
    }
}
