//! Repositorio de alquileres (motor transaccional del ciclo de vida)
//!
//! Cada comando (crear, actualizar, borrar, activar) corre en una única
//! transacción con `SELECT ... FOR UPDATE` sobre las filas implicadas, de
//! forma que la escritura del alquiler y la del flag de disponibilidad del
//! coche se confirman o revierten juntas. Dos CreateRental concurrentes
//! sobre el mismo coche serializan en el lock de la fila del coche: como
//! mucho uno ve `is_available = true`.
//!
//! Política de disponibilidad: flag único por coche (un solo alquiler no
//! terminal a la vez). No se hace comprobación de solapamiento de intervalos;
//! ver DESIGN.md.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::rental::{compute_total, plan_booking_update, Rental, RentalStatus};
use crate::repositories::car_repository::CarRepository;
use crate::utils::errors::AppError;

pub struct RentalRepository {
    pool: PgPool,
}

impl RentalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Rental>, AppError> {
        let result = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Error finding rental: {}", e)))?;

        Ok(result)
    }

    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<RentalStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Rental>, AppError> {
        let result = sqlx::query_as::<_, Rental>(
            r#"
            SELECT * FROM rentals
            WHERE user_id = $1
              AND ($2::rental_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error listing rentals: {}", e)))?;

        Ok(result)
    }

    /// ¿Existe algún alquiler no terminal sobre este coche?
    /// Lo usa el CRUD de coches para rechazar escrituras directas del flag.
    pub async fn has_open_rental(&self, car_id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM rentals WHERE car_id = $1 AND status IN ('pending', 'active'))",
        )
        .bind(car_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error checking open rentals: {}", e)))?;

        Ok(result.0)
    }

    /// Crear un alquiler reservando el coche.
    ///
    /// Bajo el lock de la fila del coche: si `is_available` es false falla
    /// con CarUnavailable; si no, inserta el alquiler en pending con el
    /// total calculado sobre la tarifa actual y marca el coche como no
    /// disponible, todo en la misma transacción.
    pub async fn create_booking(
        &self,
        car_id: Uuid,
        user_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        notes: Option<String>,
    ) -> Result<Rental, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Error starting transaction: {}", e)))?;

        let car = CarRepository::find_by_id_for_update(&mut tx, car_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        car.ensure_available()?;

        let total_amount = compute_total(car.daily_rate, start_date, end_date);
        let rental = Rental::new(car_id, user_id, start_date, end_date, total_amount, notes);

        let created = sqlx::query_as::<_, Rental>(
            r#"
            INSERT INTO rentals (
                id, car_id, user_id, start_date, end_date, total_amount,
                status, notes, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(rental.id)
        .bind(rental.car_id)
        .bind(rental.user_id)
        .bind(rental.start_date)
        .bind(rental.end_date)
        .bind(rental.total_amount)
        .bind(rental.status)
        .bind(&rental.notes)
        .bind(rental.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::Database(format!("Error creating rental: {}", e)))?;

        CarRepository::set_availability(&mut tx, car_id, false).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Error committing rental: {}", e)))?;

        log::info!("📝 Alquiler {} creado para coche {}", created.id, car_id);
        Ok(created)
    }

    /// Actualizar fechas, notas o estado de un alquiler.
    ///
    /// Reglas bajo el lock de la fila del alquiler:
    /// - solo el arrendatario o un admin pueden modificar (Forbidden)
    /// - un alquiler terminal no admite cambios; re-fijar el mismo estado
    ///   terminal es un no-op (así la liberación nunca se dispara dos veces)
    /// - las transiciones se validan contra la máquina de estados
    /// - si cambian las fechas se revalida el rango y se recalcula el total
    ///   con la tarifa actual del coche
    /// - al entrar en estado terminal desde uno no terminal se libera el
    ///   coche exactamente una vez, dentro de la misma transacción
    pub async fn update_booking(
        &self,
        rental_id: Uuid,
        acting_user_id: Uuid,
        is_admin: bool,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        new_status: Option<RentalStatus>,
        notes: Option<String>,
    ) -> Result<Rental, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Error starting transaction: {}", e)))?;

        let current = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1 FOR UPDATE")
            .bind(rental_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Error locking rental: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

        if !is_admin && current.user_id != acting_user_id {
            return Err(AppError::Forbidden(
                "Only the renter or an administrator can modify this rental".to_string(),
            ));
        }

        let plan = match plan_booking_update(
            &current,
            start_date,
            end_date,
            new_status,
            notes.is_some(),
        )? {
            Some(plan) => plan,
            // Re-fijar el mismo estado terminal: nada que escribir
            None => return Ok(current),
        };

        let total_amount = if plan.dates_changed {
            let car = CarRepository::find_by_id_for_update(&mut tx, current.car_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;
            compute_total(car.daily_rate, plan.start_date, plan.end_date)
        } else {
            current.total_amount
        };

        let updated = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
            SET start_date = $2, end_date = $3, total_amount = $4, status = $5, notes = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(rental_id)
        .bind(plan.start_date)
        .bind(plan.end_date)
        .bind(total_amount)
        .bind(plan.status)
        .bind(notes.or(current.notes))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::Database(format!("Error updating rental: {}", e)))?;

        if plan.release_car {
            CarRepository::set_availability(&mut tx, current.car_id, true).await?;
            log::info!(
                "🔓 Coche {} liberado por transición a {}",
                current.car_id,
                plan.status.as_str()
            );
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Error committing rental update: {}", e)))?;

        Ok(updated)
    }

    /// Borrar un alquiler liberando siempre su coche.
    ///
    /// Excepción administrativa documentada: a diferencia del camino de
    /// update (liberación solo al entrar en estado terminal), el borrado
    /// libera el coche incondicionalmente, también para alquileres ya
    /// terminales.
    pub async fn delete_booking(
        &self,
        rental_id: Uuid,
        acting_user_id: Uuid,
        is_admin: bool,
    ) -> Result<(), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Error starting transaction: {}", e)))?;

        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1 FOR UPDATE")
            .bind(rental_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Error locking rental: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

        if !is_admin && rental.user_id != acting_user_id {
            return Err(AppError::Forbidden(
                "Only the renter or an administrator can delete this rental".to_string(),
            ));
        }

        CarRepository::set_availability(&mut tx, rental.car_id, true).await?;

        sqlx::query("DELETE FROM rentals WHERE id = $1")
            .bind(rental_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Error deleting rental: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Error committing rental delete: {}", e)))?;

        log::info!("🗑️ Alquiler {} borrado, coche {} liberado", rental_id, rental.car_id);
        Ok(())
    }

    /// Transición pending -> active disparada por un pago completado.
    ///
    /// Idempotente: si el alquiler ya está active (o terminal) no se toca
    /// nada, porque el proveedor puede entregar la confirmación más de una
    /// vez. El coche sigue ocupado, así que no hay cambio de disponibilidad.
    pub async fn activate_if_pending(&self, rental_id: Uuid) -> Result<Rental, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Error starting transaction: {}", e)))?;

        let current = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1 FOR UPDATE")
            .bind(rental_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Error locking rental: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

        if current.status != RentalStatus::Pending {
            tx.commit()
                .await
                .map_err(|e| AppError::Database(format!("Error committing: {}", e)))?;
            return Ok(current);
        }

        let updated = sqlx::query_as::<_, Rental>(
            "UPDATE rentals SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(rental_id)
        .bind(RentalStatus::Active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::Database(format!("Error activating rental: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Error committing activation: {}", e)))?;

        log::info!("✅ Alquiler {} activado por pago confirmado", rental_id);
        Ok(updated)
    }
}
