//! Modelo de Car
//!
//! Este módulo contiene el struct Car y sus variantes para CRUD operations.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.
//!
//! Invariante de disponibilidad: `is_available` es false mientras exista un
//! alquiler no terminal (pending o active) sobre el coche, y true en caso
//! contrario. El flag solo lo mutan las transiciones del ciclo de vida de
//! alquileres, nunca los clientes de la API directamente.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Car principal - mapea exactamente a la tabla cars
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Car {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub license_plate: String,
    pub year: i32,
    pub color: String,
    pub transmission: String,
    pub fuel_type: String,
    pub seats: i32,
    pub daily_rate: Decimal,
    pub is_available: bool,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Car {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        brand: String,
        model: String,
        license_plate: String,
        year: i32,
        color: String,
        transmission: String,
        fuel_type: String,
        seats: i32,
        daily_rate: Decimal,
        description: Option<String>,
        image: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            brand,
            model,
            license_plate,
            year,
            color,
            transmission,
            fuel_type,
            seats,
            daily_rate,
            is_available: true,
            description,
            image,
            created_at: Utc::now(),
        }
    }

    /// Precondición de reserva: el coche tiene que estar libre.
    /// Falla con CarUnavailable sea cual sea el rango de fechas pedido.
    pub fn ensure_available(&self) -> Result<(), AppError> {
        if !self.is_available {
            return Err(AppError::CarUnavailable(
                "Car is not available for rental".to_string(),
            ));
        }
        Ok(())
    }
}

/// Valores permitidos para transmission
pub const TRANSMISSIONS: &[&str] = &["manual", "automatic"];

/// Valores permitidos para fuel_type
pub const FUEL_TYPES: &[&str] = &["gasoline", "diesel", "electric", "hybrid"];

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn test_car() -> Car {
        Car::new(
            "Toyota".to_string(),
            "Corolla".to_string(),
            "AB-123-CD".to_string(),
            2022,
            "White".to_string(),
            "automatic".to_string(),
            "gasoline".to_string(),
            5,
            Decimal::new(5000, 2),
            None,
            None,
        )
    }

    #[test]
    fn test_new_car_is_available() {
        let car = test_car();
        assert!(car.is_available);
        assert!(car.ensure_available().is_ok());
    }

    #[test]
    fn test_booked_car_rejects_booking() {
        let mut car = test_car();
        car.is_available = false;

        let err = car.ensure_available().unwrap_err();
        assert!(matches!(err, AppError::CarUnavailable(_)));
    }
}
