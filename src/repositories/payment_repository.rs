//! Repositorio de pagos

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::payment::Payment;
use crate::utils::errors::AppError;

pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payment: &Payment) -> Result<Payment, AppError> {
        let result = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (
                id, rental_id, amount, payment_method, transaction_id, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(payment.id)
        .bind(payment.rental_id)
        .bind(payment.amount)
        .bind(&payment.payment_method)
        .bind(&payment.transaction_id)
        .bind(payment.status)
        .bind(payment.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error creating payment: {}", e)))?;

        Ok(result)
    }

    /// El transaction_id es el intent del proveedor: si ya hay un pago
    /// registrado para él, una confirmación repetida devuelve ese registro.
    pub async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, AppError> {
        let result =
            sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE transaction_id = $1")
                .bind(transaction_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::Database(format!("Error finding payment: {}", e)))?;

        Ok(result)
    }

    pub async fn find_by_rental(&self, rental_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let result = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE rental_id = $1 ORDER BY created_at DESC",
        )
        .bind(rental_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error listing payments: {}", e)))?;

        Ok(result)
    }
}
