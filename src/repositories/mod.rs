//! Capa de acceso a datos
//!
//! Repositorios sqlx por entidad. Los comandos del ciclo de vida de
//! alquileres (rental_repository) son los únicos que escriben el flag de
//! disponibilidad de los coches.

pub mod car_repository;
pub mod payment_repository;
pub mod rental_repository;
pub mod user_repository;
