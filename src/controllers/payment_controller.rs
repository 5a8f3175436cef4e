//! Controlador de pagos (adaptador de reconciliación)
//!
//! Traduce confirmaciones del proveedor externo en registros Payment y, si
//! el pago se completó, dispara la activación pending -> active del alquiler.
//! Las confirmaciones pueden llegar repetidas: la reconciliación es
//! idempotente y nunca produce una segunda transición ni un error.

use std::sync::Arc;

use sqlx::PgPool;

use crate::dto::auth_dto::ApiResponse;
use crate::dto::payment_dto::{
    ConfirmPaymentRequest, CreateIntentRequest, CreateIntentResponse, PaymentResponse,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::payment::{Payment, PaymentStatus};
use crate::repositories::payment_repository::PaymentRepository;
use crate::repositories::rental_repository::RentalRepository;
use crate::services::payment_provider::{amount_to_cents, PaymentProviderClient};
use crate::utils::errors::AppError;

pub struct PaymentController {
    payments: PaymentRepository,
    rentals: RentalRepository,
    provider: Arc<PaymentProviderClient>,
    currency: String,
}

impl PaymentController {
    pub fn new(pool: PgPool, provider: Arc<PaymentProviderClient>, currency: String) -> Self {
        Self {
            payments: PaymentRepository::new(pool.clone()),
            rentals: RentalRepository::new(pool),
            provider,
            currency,
        }
    }

    /// Crear un payment intent por el total del alquiler.
    /// El importe sale del total_amount almacenado, nunca del cliente.
    pub async fn create_intent(
        &self,
        user: &AuthenticatedUser,
        request: CreateIntentRequest,
    ) -> Result<CreateIntentResponse, AppError> {
        let rental = self
            .rentals
            .find_by_id(request.rental_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

        if !user.can_access(rental.user_id) {
            return Err(AppError::Forbidden(
                "Only the renter or an administrator can pay for this rental".to_string(),
            ));
        }

        let amount_cents = amount_to_cents(rental.total_amount)?;
        let intent = self
            .provider
            .create_intent(amount_cents, &self.currency, rental.id)
            .await?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            AppError::PaymentProvider("Provider returned no client secret".to_string())
        })?;

        Ok(CreateIntentResponse { client_secret })
    }

    /// Confirmar un pago consultando el estado autoritativo del intent.
    ///
    /// Si el proveedor falla no se crea ningún Payment. Si el intent ya fue
    /// registrado, se devuelve el registro existente sin repetir transición.
    pub async fn confirm(
        &self,
        user: &AuthenticatedUser,
        request: ConfirmPaymentRequest,
    ) -> Result<ApiResponse<PaymentResponse>, AppError> {
        let rental = self
            .rentals
            .find_by_id(request.rental_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

        if !user.can_access(rental.user_id) {
            return Err(AppError::Forbidden(
                "Only the renter or an administrator can confirm this payment".to_string(),
            ));
        }

        // Confirmación repetida: el intent ya está registrado
        if let Some(existing) = self
            .payments
            .find_by_transaction_id(&request.payment_intent_id)
            .await?
        {
            if existing.status == PaymentStatus::Completed {
                // activate_if_pending es idempotente: no-op si ya está active
                self.rentals.activate_if_pending(existing.rental_id).await?;
            }
            return Ok(ApiResponse::success_with_message(
                existing.into(),
                "Payment already processed".to_string(),
            ));
        }

        // Consulta al proveedor antes de abrir ninguna transacción de BD.
        // Un fallo aquí sube como PaymentProvider y no crea ningún registro.
        let intent = self
            .provider
            .retrieve_intent(&request.payment_intent_id)
            .await?;

        let status = if intent.is_succeeded() {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Failed
        };

        // El importe autoritativo es el del intent del proveedor
        let payment = Payment::new(
            rental.id,
            intent.amount_decimal(),
            request
                .payment_method
                .unwrap_or_else(|| "credit_card".to_string()),
            intent.id,
            status,
        );

        let saved = self.payments.create(&payment).await?;

        if saved.status == PaymentStatus::Completed {
            self.rentals.activate_if_pending(rental.id).await?;
        }

        Ok(ApiResponse::success_with_message(
            saved.into(),
            "Payment processed successfully".to_string(),
        ))
    }

    pub async fn list_by_rental(
        &self,
        user: &AuthenticatedUser,
        rental_id: uuid::Uuid,
    ) -> Result<Vec<PaymentResponse>, AppError> {
        let rental = self
            .rentals
            .find_by_id(rental_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

        if !user.can_access(rental.user_id) {
            return Err(AppError::Forbidden(
                "Only the renter or an administrator can view these payments".to_string(),
            ));
        }

        let payments = self.payments.find_by_rental(rental_id).await?;
        Ok(payments.into_iter().map(Into::into).collect())
    }
}
