//! Routers de la API
//!
//! Handlers finos: extraen, delegan al controlador y serializan.

pub mod auth_routes;
pub mod car_routes;
pub mod payment_routes;
pub mod rental_routes;
