use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::car::Car;

/// Request para crear un nuevo coche
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCarRequest {
    #[validate(length(min = 2, max = 100))]
    pub brand: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(length(min = 5, max = 20))]
    pub license_plate: String,

    #[validate(range(min = 1900, max = 2030))]
    pub year: i32,

    #[validate(length(min = 2, max = 50))]
    pub color: String,

    #[validate(length(min = 2, max = 20))]
    pub transmission: String,

    #[validate(length(min = 2, max = 20))]
    pub fuel_type: String,

    #[validate(range(min = 1, max = 10))]
    pub seats: i32,

    pub daily_rate: Decimal,

    pub description: Option<String>,
    pub image: Option<String>,
}

/// Request para actualizar un coche existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCarRequest {
    #[validate(length(min = 2, max = 100))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(length(min = 5, max = 20))]
    pub license_plate: Option<String>,

    #[validate(range(min = 1900, max = 2030))]
    pub year: Option<i32>,

    #[validate(length(min = 2, max = 50))]
    pub color: Option<String>,

    #[validate(length(min = 2, max = 20))]
    pub transmission: Option<String>,

    #[validate(length(min = 2, max = 20))]
    pub fuel_type: Option<String>,

    #[validate(range(min = 1, max = 10))]
    pub seats: Option<i32>,

    pub daily_rate: Option<Decimal>,

    // Solo se acepta mientras el coche no tenga un alquiler abierto:
    // con alquiler abierto el flag lo gobierna el ciclo de vida del alquiler
    pub is_available: Option<bool>,

    pub description: Option<String>,
    pub image: Option<String>,
}

/// Response de coche para la API
#[derive(Debug, Serialize)]
pub struct CarResponse {
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

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            id: car.id,
            brand: car.brand,
            model: car.model,
            license_plate: car.license_plate,
            year: car.year,
            color: car.color,
            transmission: car.transmission,
            fuel_type: car.fuel_type,
            seats: car.seats,
            daily_rate: car.daily_rate,
            is_available: car.is_available,
            description: car.description,
            image: car.image,
            created_at: car.created_at,
        }
    }
}

/// Filtros para búsqueda de coches
#[derive(Debug, Deserialize)]
pub struct CarFilters {
    pub brand: Option<String>,
    pub available: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
