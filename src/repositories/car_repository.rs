//! Repositorio de coches (almacén de disponibilidad)
//!
//! Lecturas y escrituras de la tabla cars. El flag `is_available` solo se
//! escribe desde las transiciones del ciclo de vida de alquileres
//! (rental_repository), vía `set_availability` dentro de la misma transacción.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::car_dto::CarFilters;
use crate::models::car::Car;
use crate::utils::errors::AppError;

pub struct CarRepository {
    pool: PgPool,
}

impl CarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, car: &Car) -> Result<Car, AppError> {
        let result = sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (
                id, brand, model, license_plate, year, color, transmission,
                fuel_type, seats, daily_rate, is_available, description, image,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(car.id)
        .bind(&car.brand)
        .bind(&car.model)
        .bind(&car.license_plate)
        .bind(car.year)
        .bind(&car.color)
        .bind(&car.transmission)
        .bind(&car.fuel_type)
        .bind(car.seats)
        .bind(car.daily_rate)
        .bind(car.is_available)
        .bind(&car.description)
        .bind(&car.image)
        .bind(car.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error creating car: {}", e)))?;

        Ok(result)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Car>, AppError> {
        let result = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Error finding car: {}", e)))?;

        Ok(result)
    }

    pub async fn list(&self, filters: &CarFilters) -> Result<Vec<Car>, AppError> {
        let brand_pattern = filters.brand.as_ref().map(|b| format!("%{}%", b));

        let result = sqlx::query_as::<_, Car>(
            r#"
            SELECT * FROM cars
            WHERE ($1::text IS NULL OR brand ILIKE $1)
              AND ($2::boolean IS NULL OR is_available = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(brand_pattern)
        .bind(filters.available)
        .bind(filters.limit.unwrap_or(50))
        .bind(filters.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error listing cars: {}", e)))?;

        Ok(result)
    }

    pub async fn license_plate_exists(&self, license_plate: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM cars WHERE license_plate = $1)")
                .bind(license_plate)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::Database(format!("Error checking license plate: {}", e)))?;

        Ok(result.0)
    }

    pub async fn update(&self, car: &Car) -> Result<Car, AppError> {
        let result = sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET brand = $2, model = $3, license_plate = $4, year = $5,
                color = $6, transmission = $7, fuel_type = $8, seats = $9,
                daily_rate = $10, is_available = $11, description = $12,
                image = $13
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(car.id)
        .bind(&car.brand)
        .bind(&car.model)
        .bind(&car.license_plate)
        .bind(car.year)
        .bind(&car.color)
        .bind(&car.transmission)
        .bind(&car.fuel_type)
        .bind(car.seats)
        .bind(car.daily_rate)
        .bind(car.is_available)
        .bind(&car.description)
        .bind(&car.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error updating car: {}", e)))?;

        Ok(result)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Error deleting car: {}", e)))?;

        Ok(())
    }

    /// Bloquear la fila del coche dentro de una transacción.
    /// Dos CreateRental concurrentes sobre el mismo coche serializan aquí.
    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Car>, AppError> {
        let result = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::Database(format!("Error locking car: {}", e)))?;

        Ok(result)
    }

    /// Escritura idempotente del flag de disponibilidad, sin más efectos.
    /// Solo el ciclo de vida de alquileres debe llamar aquí.
    pub async fn set_availability(
        tx: &mut Transaction<'_, Postgres>,
        car_id: Uuid,
        available: bool,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE cars SET is_available = $2 WHERE id = $1")
            .bind(car_id)
            .bind(available)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::Database(format!("Error updating car availability: {}", e)))?;

        Ok(())
    }
}
