//! Controladores de la aplicación
//!
//! Reglas de negocio por recurso. El motor del ciclo de vida de alquileres
//! vive en rental_controller; la reconciliación de pagos en
//! payment_controller.

pub mod auth_controller;
pub mod car_controller;
pub mod payment_controller;
pub mod rental_controller;
