//! Controlador de coches (CRUD de flota)
//!
//! Gestión del inventario, solo para administradores en escritura. Mientras
//! un coche tenga un alquiler abierto, su flag de disponibilidad pertenece
//! al ciclo de vida del alquiler: aquí se rechazan las escrituras directas
//! del flag y el borrado del coche.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::ApiResponse;
use crate::dto::car_dto::{CarFilters, CarResponse, CreateCarRequest, UpdateCarRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::car::{Car, FUEL_TYPES, TRANSMISSIONS};
use crate::repositories::car_repository::CarRepository;
use crate::repositories::rental_repository::RentalRepository;
use crate::utils::errors::{conflict_error, not_found_error, AppError};
use crate::utils::validation::{validate_license_plate, validate_positive};

pub struct CarController {
    repository: CarRepository,
    rentals: RentalRepository,
}

impl CarController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CarRepository::new(pool.clone()),
            rentals: RentalRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateCarRequest,
    ) -> Result<ApiResponse<CarResponse>, AppError> {
        if !user.is_admin() {
            return Err(AppError::Forbidden(
                "Only administrators can manage the fleet".to_string(),
            ));
        }

        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if !TRANSMISSIONS.contains(&request.transmission.as_str()) {
            return Err(AppError::Validation(format!(
                "Unknown transmission '{}'",
                request.transmission
            )));
        }
        if !FUEL_TYPES.contains(&request.fuel_type.as_str()) {
            return Err(AppError::Validation(format!(
                "Unknown fuel type '{}'",
                request.fuel_type
            )));
        }
        validate_positive(request.daily_rate)
            .map_err(|_| AppError::Validation("daily_rate must be positive".to_string()))?;
        validate_license_plate(&request.license_plate)
            .map_err(|_| AppError::Validation("Invalid license plate format".to_string()))?;

        if self
            .repository
            .license_plate_exists(&request.license_plate)
            .await?
        {
            return Err(conflict_error("Car", "license_plate", &request.license_plate));
        }

        let car = Car::new(
            request.brand,
            request.model,
            request.license_plate,
            request.year,
            request.color,
            request.transmission,
            request.fuel_type,
            request.seats,
            request.daily_rate,
            request.description,
            request.image,
        );

        let saved = self.repository.create(&car).await?;

        Ok(ApiResponse::success_with_message(
            saved.into(),
            "Car created successfully".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<CarResponse, AppError> {
        let car = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Car", &id.to_string()))?;

        Ok(car.into())
    }

    pub async fn list(&self, filters: CarFilters) -> Result<Vec<CarResponse>, AppError> {
        let cars = self.repository.list(&filters).await?;
        Ok(cars.into_iter().map(Into::into).collect())
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateCarRequest,
    ) -> Result<ApiResponse<CarResponse>, AppError> {
        if !user.is_admin() {
            return Err(AppError::Forbidden(
                "Only administrators can manage the fleet".to_string(),
            ));
        }

        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let current = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Car", &id.to_string()))?;

        // Con un alquiler abierto el flag lo gobierna el ciclo de vida
        if request.is_available.is_some() && self.rentals.has_open_rental(id).await? {
            return Err(AppError::Conflict(
                "Availability is managed by the rental lifecycle while a rental is open"
                    .to_string(),
            ));
        }

        if let Some(ref transmission) = request.transmission {
            if !TRANSMISSIONS.contains(&transmission.as_str()) {
                return Err(AppError::Validation(format!(
                    "Unknown transmission '{}'",
                    transmission
                )));
            }
        }
        if let Some(ref fuel_type) = request.fuel_type {
            if !FUEL_TYPES.contains(&fuel_type.as_str()) {
                return Err(AppError::Validation(format!(
                    "Unknown fuel type '{}'",
                    fuel_type
                )));
            }
        }
        if let Some(rate) = request.daily_rate {
            validate_positive(rate)
                .map_err(|_| AppError::Validation("daily_rate must be positive".to_string()))?;
        }

        if let Some(ref plate) = request.license_plate {
            validate_license_plate(plate)
                .map_err(|_| AppError::Validation("Invalid license plate format".to_string()))?;
            if plate != &current.license_plate && self.repository.license_plate_exists(plate).await?
            {
                return Err(conflict_error("Car", "license_plate", plate));
            }
        }

        let merged = Car {
            id: current.id,
            brand: request.brand.unwrap_or(current.brand),
            model: request.model.unwrap_or(current.model),
            license_plate: request.license_plate.unwrap_or(current.license_plate),
            year: request.year.unwrap_or(current.year),
            color: request.color.unwrap_or(current.color),
            transmission: request.transmission.unwrap_or(current.transmission),
            fuel_type: request.fuel_type.unwrap_or(current.fuel_type),
            seats: request.seats.unwrap_or(current.seats),
            daily_rate: request.daily_rate.unwrap_or(current.daily_rate),
            is_available: request.is_available.unwrap_or(current.is_available),
            description: request.description.or(current.description),
            image: request.image.or(current.image),
            created_at: current.created_at,
        };

        let saved = self.repository.update(&merged).await?;

        Ok(ApiResponse::success_with_message(
            saved.into(),
            "Car updated successfully".to_string(),
        ))
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<(), AppError> {
        if !user.is_admin() {
            return Err(AppError::Forbidden(
                "Only administrators can manage the fleet".to_string(),
            ));
        }

        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Car", &id.to_string()))?;

        if self.rentals.has_open_rental(id).await? {
            return Err(AppError::Conflict(
                "Car has an open rental and cannot be deleted".to_string(),
            ));
        }

        self.repository.delete(id).await
    }
}
