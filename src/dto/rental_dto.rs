use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::rental::{Rental, RentalStatus};

/// Request para crear un nuevo alquiler
#[derive(Debug, Deserialize)]
pub struct CreateRentalRequest {
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
}

/// Patch para actualizar un alquiler existente.
/// El status llega como string y se valida contra la máquina de estados.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateRentalRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Response de alquiler para la API
#[derive(Debug, Serialize)]
pub struct RentalResponse {
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_amount: Decimal,
    pub status: RentalStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Rental> for RentalResponse {
    fn from(rental: Rental) -> Self {
        Self {
            id: rental.id,
            car_id: rental.car_id,
            user_id: rental.user_id,
            start_date: rental.start_date,
            end_date: rental.end_date,
            total_amount: rental.total_amount,
            status: rental.status,
            notes: rental.notes,
            created_at: rental.created_at,
        }
    }
}

/// Filtros para listado de alquileres
#[derive(Debug, Deserialize)]
pub struct RentalFilters {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
