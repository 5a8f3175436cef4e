use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::payment::{Payment, PaymentStatus};

/// Request para crear un payment intent contra el proveedor.
/// El importe se toma del total_amount del alquiler, nunca del cliente.
#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub rental_id: Uuid,
}

/// Response con el client_secret del intent creado
#[derive(Debug, Serialize)]
pub struct CreateIntentResponse {
    pub client_secret: String,
}

/// Request para confirmar un pago ya autorizado por el proveedor
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub payment_intent_id: String,
    pub rental_id: Uuid,
    pub payment_method: Option<String>,
}

/// Response de pago para la API
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub rental_id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            rental_id: payment.rental_id,
            amount: payment.amount,
            payment_method: payment.payment_method,
            transaction_id: payment.transaction_id,
            status: payment.status,
            created_at: payment.created_at,
        }
    }
}
