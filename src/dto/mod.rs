//! DTOs de la API
//!
//! Requests y responses serializables, separados de los modelos de base de datos.

pub mod auth_dto;
pub mod car_dto;
pub mod payment_dto;
pub mod rental_dto;
