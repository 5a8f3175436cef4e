//! Controlador de alquileres (motor del ciclo de vida)
//!
//! Valida las peticiones de reserva, aplica la máquina de estados y delega
//! en el repositorio transaccional. La identidad actuante llega siempre como
//! parámetro explícito desde el middleware de autenticación.

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::ApiResponse;
use crate::dto::rental_dto::{
    CreateRentalRequest, RentalFilters, RentalResponse, UpdateRentalRequest,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::rental::RentalStatus;
use crate::repositories::rental_repository::RentalRepository;
use crate::utils::errors::AppError;

pub struct RentalController {
    repository: RentalRepository,
}

impl RentalController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: RentalRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateRentalRequest,
    ) -> Result<ApiResponse<RentalResponse>, AppError> {
        // Validar rango de fechas: inicio hoy o después, fin estrictamente posterior
        let today = chrono::Utc::now().date_naive();
        if request.start_date < today {
            return Err(AppError::InvalidRange(
                "start_date cannot be in the past".to_string(),
            ));
        }
        if request.end_date <= request.start_date {
            return Err(AppError::InvalidRange(
                "end_date must be after start_date".to_string(),
            ));
        }

        // Existencia del coche, disponibilidad y cálculo del total se
        // resuelven bajo lock en el repositorio
        let rental = self
            .repository
            .create_booking(
                request.car_id,
                user.user_id,
                request.start_date,
                request.end_date,
                request.notes,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            rental.into(),
            "Rental created successfully".to_string(),
        ))
    }

    pub async fn get_by_id(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<RentalResponse, AppError> {
        let rental = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

        if !user.can_access(rental.user_id) {
            return Err(AppError::Forbidden(
                "Only the renter or an administrator can view this rental".to_string(),
            ));
        }

        Ok(rental.into())
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: RentalFilters,
    ) -> Result<Vec<RentalResponse>, AppError> {
        let status = match filters.status.as_deref() {
            Some(raw) => Some(RentalStatus::parse(raw).ok_or_else(|| {
                AppError::Validation(format!("Unknown rental status '{}'", raw))
            })?),
            None => None,
        };

        let rentals = self
            .repository
            .list_by_user(
                user.user_id,
                status,
                filters.limit.unwrap_or(50),
                filters.offset.unwrap_or(0),
            )
            .await?;

        Ok(rentals.into_iter().map(Into::into).collect())
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateRentalRequest,
    ) -> Result<ApiResponse<RentalResponse>, AppError> {
        let new_status = match request.status.as_deref() {
            Some(raw) => Some(RentalStatus::parse(raw).ok_or_else(|| {
                AppError::Validation(format!("Unknown rental status '{}'", raw))
            })?),
            None => None,
        };

        let rental = self
            .repository
            .update_booking(
                id,
                user.user_id,
                user.is_admin(),
                request.start_date,
                request.end_date,
                new_status,
                request.notes,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            rental.into(),
            "Rental updated successfully".to_string(),
        ))
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<(), AppError> {
        self.repository
            .delete_booking(id, user.user_id, user.is_admin())
            .await
    }
}
